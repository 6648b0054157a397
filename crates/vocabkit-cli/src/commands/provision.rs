use stderrlog::LogLevelNum;

use crate::{logging::LogArgs, options_args::OptionsArgs};

/// Args for the provision command.
#[derive(clap::Args, Debug)]
pub struct ProvisionArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The training corpus.
    #[arg(long)]
    train: String,

    /// The vocabulary file; when omitted, one is found or created next to the corpus.
    #[arg(long, default_value = "")]
    vocab: String,

    /// Cap on the vocabulary size, reserved symbols included; 0 is unbounded.
    #[arg(long, default_value = "0")]
    max: usize,

    #[command(flatten)]
    options: OptionsArgs,
}

impl ProvisionArgs {
    /// Run the provision command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Info)?;

        let mut vocab = self.options.init_vocab()?;
        let size = vocab.load_or_create(&self.vocab, &self.train, self.max)?;

        println!("{size}\t{}", vocab.type_name());
        Ok(())
    }
}
