//! Corpus and result stream arguments shared by the commands.

use std::{
    convert::Infallible,
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// A command stream: a file, or the process's standard stream for ``-``.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPath {
    /// Stdin or stdout, depending on direction.
    Standard,

    /// A file on disk.
    File(PathBuf),
}

impl FromStr for StreamPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "-" {
            Self::Standard
        } else {
            Self::File(PathBuf::from(s))
        })
    }
}

impl fmt::Display for StreamPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("-"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn with_path(
    err: io::Error,
    action: &str,
    path: &Path,
) -> io::Error {
    io::Error::new(err.kind(), format!("cannot {action} {}: {err}", path.display()))
}

impl StreamPath {
    fn open_reader(&self) -> io::Result<Box<dyn BufRead>> {
        Ok(match self {
            Self::Standard => Box::new(BufReader::new(io::stdin().lock())),
            Self::File(path) => Box::new(BufReader::new(
                File::open(path).map_err(|e| with_path(e, "read", path))?,
            )),
        })
    }

    fn open_writer(&self) -> io::Result<Box<dyn Write>> {
        Ok(match self {
            Self::Standard => Box::new(BufWriter::new(io::stdout().lock())),
            Self::File(path) => Box::new(BufWriter::new(
                File::create(path).map_err(|e| with_path(e, "write", path))?,
            )),
        })
    }
}

/// Input argument group.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Input file, repeatable; files are read back to back.
    /// "-" or no input reads stdin.
    #[arg(long = "input", value_name = "PATH")]
    pub inputs: Vec<StreamPath>,
}

impl InputArgs {
    /// Open one reader over every input, in order.
    pub fn open_reader(&self) -> Result<Box<dyn BufRead>, Box<dyn std::error::Error>> {
        let mut inputs = self.inputs.iter();
        let Some(first) = inputs.next() else {
            return Ok(StreamPath::Standard.open_reader()?);
        };

        let mut reader = first.open_reader()?;
        for input in inputs {
            log::debug!("chaining input {input}");
            reader = Box::new(reader.chain(input.open_reader()?));
        }
        Ok(reader)
    }
}

/// Output argument group.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output file; "-" or no output writes stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<StreamPath>,
}

impl OutputArgs {
    /// Open a writer for the output.
    pub fn open_writer(&self) -> Result<Box<dyn Write>, Box<dyn std::error::Error>> {
        Ok(self
            .output
            .as_ref()
            .unwrap_or(&StreamPath::Standard)
            .open_writer()?)
    }
}
