mod build;
mod cat;
mod provision;

/// Subcommands for vocabkit
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build a word-level vocabulary from a corpus stream.
    Build(build::BuildArgs),

    /// Find, create, or load the vocabulary for a training corpus.
    Provision(provision::ProvisionArgs),

    /// Act as a streaming encoder or decoder.
    Cat(cat::CatArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Build(cmd) => cmd.run(),
            Commands::Provision(cmd) => cmd.run(),
            Commands::Cat(cmd) => cmd.run(),
        }
    }
}
