//! # Vocabulary Options
//!
//! The options bag handed unmodified to backend constructors.
//! The [`crate::Vocab`] facade never reads it.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::VocabResult;

/// Default cap on corpus lines sampled for subword training.
pub const DEFAULT_SUBWORD_MAX_LINES: usize = 2_000_000;

/// Default seed for sampling.
pub const DEFAULT_SEED: u64 = 1234;

/// Options for vocabulary backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabOptions {
    /// Target subword vocabulary sizes, one per input stream.
    pub dim_vocabs: Vec<usize>,

    /// Maximum number of corpus lines sampled when training subwords; 0 is unbounded.
    pub subword_max_lines: usize,

    /// Merge-dropout probability for training-time subword encoding.
    pub subword_alpha: f32,

    /// Seed for line sampling and merge dropout.
    pub seed: u64,
}

impl Default for VocabOptions {
    fn default() -> Self {
        Self {
            dim_vocabs: Vec::new(),
            subword_max_lines: DEFAULT_SUBWORD_MAX_LINES,
            subword_alpha: 0.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl VocabOptions {
    /// Read options from a JSON file.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_path(path: impl AsRef<Path>) -> VocabResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// The target vocabulary size for the given input stream.
    ///
    /// Streams past the end of `dim_vocabs` reuse the last entry.
    ///
    /// ## Returns
    /// `None` if no size is configured.
    pub fn vocab_size_for(
        &self,
        batch_index: usize,
    ) -> Option<usize> {
        self.dim_vocabs
            .get(batch_index)
            .or_else(|| self.dim_vocabs.last())
            .copied()
            .filter(|&size| size > 0)
    }

    /// Sets the per-stream target vocabulary sizes.
    pub fn with_dim_vocabs<I>(
        self,
        dim_vocabs: I,
    ) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            dim_vocabs: dim_vocabs.into_iter().collect(),
            ..self
        }
    }

    /// Sets the subword training line cap.
    pub fn with_subword_max_lines(
        self,
        subword_max_lines: usize,
    ) -> Self {
        Self {
            subword_max_lines,
            ..self
        }
    }

    /// Sets the merge-dropout probability.
    ///
    /// ## Panics
    /// Panics if `alpha` is outside ``[0, 1]``.
    pub fn with_subword_alpha(
        self,
        subword_alpha: f32,
    ) -> Self {
        assert!(
            (0.0..=1.0).contains(&subword_alpha),
            "subword_alpha must be in [0, 1]: {subword_alpha}"
        );
        Self {
            subword_alpha,
            ..self
        }
    }

    /// Sets the sampling seed.
    pub fn with_seed(
        self,
        seed: u64,
    ) -> Self {
        Self { seed, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_size_for() {
        let options = VocabOptions::default();
        assert_eq!(options.vocab_size_for(0), None);

        let options = options.with_dim_vocabs([100, 200]);
        assert_eq!(options.vocab_size_for(0), Some(100));
        assert_eq!(options.vocab_size_for(1), Some(200));
        assert_eq!(options.vocab_size_for(5), Some(200));

        let options = options.with_dim_vocabs([0]);
        assert_eq!(options.vocab_size_for(0), None);
    }

    #[test]
    fn test_json_defaults() {
        let options: VocabOptions = serde_json::from_str(r#"{"dim_vocabs": [32]}"#).unwrap();
        assert_eq!(options.dim_vocabs, vec![32]);
        assert_eq!(options.subword_max_lines, DEFAULT_SUBWORD_MAX_LINES);
        assert_eq!(options.seed, DEFAULT_SEED);
        assert_eq!(options.subword_alpha, 0.0);
    }

    #[test]
    fn test_from_json_path() {
        let dir = tempdir::TempDir::new("options_test").unwrap();
        let path = dir.path().join("options.json");
        let expected = VocabOptions::default()
            .with_dim_vocabs([64])
            .with_seed(7)
            .with_subword_alpha(0.25);
        std::fs::write(&path, serde_json::to_string(&expected).unwrap()).unwrap();

        assert_eq!(VocabOptions::from_json_path(&path).unwrap(), expected);
    }

    #[test]
    #[should_panic(expected = "subword_alpha")]
    fn test_bad_alpha() {
        let _ = VocabOptions::default().with_subword_alpha(1.5);
    }
}
