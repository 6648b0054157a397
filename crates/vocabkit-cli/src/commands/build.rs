use std::io::Write;

use stderrlog::LogLevelNum;
use vocabkit::{Vocab, VocabOptions};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
};

/// Args for the build command.
#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Cap on the vocabulary size, reserved symbols included; 0 is unbounded.
    #[arg(long, default_value = "0")]
    max_size: usize,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl BuildArgs {
    /// Run the build command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Info)?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        let mut vocab = Vocab::new(VocabOptions::default(), 0);
        vocab.create_from_stream(&mut reader, &mut writer, self.max_size)?;
        writer.flush()?;

        log::info!("Vocabulary Size: {}", vocab.size());
        Ok(())
    }
}
