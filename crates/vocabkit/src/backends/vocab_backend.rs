//! # Vocabulary Backend Capabilities

use core::fmt::Debug;
use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    errors::VocabResult,
    path_utils::append_suffix,
    types::{Word, Words},
};

/// The closed set of backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum BackendKind {
    /// Word-level [`crate::backends::DefaultVocab`].
    #[strum(serialize = "DefaultVocab")]
    Default,

    /// Subword [`crate::backends::SubwordVocab`].
    #[strum(serialize = "SubwordVocab")]
    Subword,
}

/// The contract every tokenization backend satisfies.
///
/// Backends start empty; [`load`](Self::load), [`create_from_stream`](Self::create_from_stream)
/// or [`create_fake`](Self::create_fake) populate the table.
/// [`create`](Self::create) only writes a vocabulary file.
///
/// Only the default backend supports the full interface;
/// others may refuse stream and fake creation with
/// [`crate::VocabError::Unsupported`].
pub trait VocabBackend: Debug + Send + Sync {
    /// The backend kind.
    fn kind(&self) -> BackendKind;

    /// The backend type tag.
    fn type_name(&self) -> &'static str {
        self.kind().into()
    }

    /// File suffixes this backend recognizes, canonical first.
    fn suffixes(&self) -> &'static [&'static str];

    /// The suffix used to derive a vocabulary path from a corpus path.
    fn canonical_suffix(&self) -> &'static str {
        self.suffixes()[0]
    }

    /// Load a persisted vocabulary, replacing the current table.
    ///
    /// ## Arguments
    /// * `path` - the vocabulary file.
    /// * `max` - cap on the total size, reserved symbols included; 0 is unbounded.
    ///
    /// ## Returns
    /// The loaded vocabulary size.
    fn load(
        &mut self,
        path: &Path,
        max: usize,
    ) -> VocabResult<usize>;

    /// Build a vocabulary file at `vocab_path` from the corpus at `train_path`.
    ///
    /// Never overwrites an existing file.
    fn create(
        &mut self,
        vocab_path: &Path,
        train_path: &Path,
    ) -> VocabResult<()>;

    /// Build a vocabulary from a corpus stream, writing it to `vocab`.
    ///
    /// ## Arguments
    /// * `train` - the corpus.
    /// * `vocab` - the output vocabulary stream.
    /// * `max_size` - cap on the total size; 0 is unbounded.
    fn create_from_stream(
        &mut self,
        train: &mut dyn BufRead,
        vocab: &mut dyn Write,
        max_size: usize,
    ) -> VocabResult<()>;

    /// Populate a minimal placeholder vocabulary of the reserved symbols.
    fn create_fake(&mut self) -> VocabResult<()>;

    /// Find and load a vocabulary next to a corpus.
    ///
    /// Probes ``train_path + suffix`` for each of [`suffixes`](Self::suffixes) in order
    /// and loads the first that exists.
    ///
    /// ## Returns
    /// The loaded size, or 0 if no candidate exists.
    fn find_and_load(
        &mut self,
        train_path: &Path,
        max: usize,
    ) -> VocabResult<usize> {
        for suffix in self.suffixes() {
            let path = append_suffix(train_path, suffix);
            if path.exists() {
                log::info!("Loading vocabulary from {}", path.display());
                return self.load(&path, max);
            }
        }
        Ok(0)
    }

    /// Look up the id of a token; unknown tokens map to [`unk_id`](Self::unk_id).
    fn word(
        &self,
        token: &str,
    ) -> Word;

    /// Look up the token for an id.
    fn token(
        &self,
        id: Word,
    ) -> Option<&str>;

    /// Encode a line of text.
    ///
    /// ## Arguments
    /// * `line` - the text.
    /// * `add_eos` - append [`eos_id`](Self::eos_id).
    /// * `inference` - disable training-time sampling.
    fn encode(
        &self,
        line: &str,
        add_eos: bool,
        inference: bool,
    ) -> Words;

    /// Decode ids back to a line of text.
    ///
    /// ## Errors
    /// Returns [`crate::VocabError::InvalidId`] for ids outside the vocabulary.
    fn decode(
        &self,
        words: &[Word],
        ignore_eos: bool,
    ) -> VocabResult<String>;

    /// The number of tokens.
    fn size(&self) -> usize;

    /// The end-of-sequence id.
    fn eos_id(&self) -> Word;

    /// The unknown-token id.
    fn unk_id(&self) -> Word;
}
