use std::io::{BufRead, Write};

use stderrlog::LogLevelNum;
use vocabkit::{Vocab, Word};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
    options_args::OptionsArgs,
};

/// Args for the cat command.
#[derive(clap::Args, Debug)]
pub struct CatArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The vocabulary file.
    #[arg(long)]
    vocab: String,

    /// Cap on the vocabulary size, reserved symbols included; 0 is unbounded.
    #[arg(long, default_value = "0")]
    max: usize,

    /// Decode ids to text, instead of encoding text to ids.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    decode: bool,

    /// Encode without a trailing end-of-sequence id; decode without rendering it.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_eos: bool,

    /// Encode in training mode, sampling segmentations when the backend supports it.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    sample: bool,

    #[command(flatten)]
    options: OptionsArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl CatArgs {
    /// Run the cat command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Warn)?;

        let mut vocab = self.options.init_vocab()?;
        vocab.load(&self.vocab, self.max)?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        if self.decode {
            run_cat_decode(&mut reader, &mut writer, &vocab, self.no_eos)
        } else {
            run_cat_encode(&mut reader, &mut writer, &vocab, !self.no_eos, !self.sample)
        }
    }
}

fn run_cat_encode(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    vocab: &Vocab,
    add_eos: bool,
    inference: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in reader.lines() {
        let words = vocab.encode(&line?, add_eos, inference);

        for (idx, word) in words.iter().enumerate() {
            write!(writer, "{}{}", if idx == 0 { "" } else { " " }, word)?;
        }
        writeln!(writer)?;
        writer.flush()?;
    }
    Ok(())
}

fn run_cat_decode(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    vocab: &Vocab,
    ignore_eos: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in reader.lines() {
        let words = line?
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Word>, _>>()?;

        writeln!(writer, "{}", vocab.decode(&words, ignore_eos)?)?;
        writer.flush()?;
    }
    Ok(())
}
