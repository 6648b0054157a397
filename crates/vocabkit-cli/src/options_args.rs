use vocabkit::{Vocab, VocabOptions};

/// Vocabulary options argument group.
#[derive(clap::Args, Debug)]
pub struct OptionsArgs {
    /// Optional JSON file of vocabulary options.
    #[clap(long, default_value = None)]
    pub config: Option<String>,

    /// The input stream the vocabulary serves.
    #[arg(long, default_value = "0")]
    pub batch_index: usize,
}

impl OptionsArgs {
    /// Read the options, or fall back to the defaults.
    pub fn load_options(&self) -> Result<VocabOptions, Box<dyn std::error::Error>> {
        Ok(match &self.config {
            Some(path) => {
                log::debug!("reading options from {path}");
                VocabOptions::from_json_path(path)?
            }
            None => VocabOptions::default(),
        })
    }

    /// Build an unresolved [`Vocab`] from these options.
    pub fn init_vocab(&self) -> Result<Vocab, Box<dyn std::error::Error>> {
        Ok(Vocab::new(self.load_options()?, self.batch_index))
    }
}
