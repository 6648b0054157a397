//! # Vocabulary Facade
//!
//! [`Vocab`] owns at most one backend, bound on first use:
//! * [`Vocab::load`] and [`Vocab::create`] probe the given path through
//!   [`crate::factory::create_vocab`];
//! * [`Vocab::create_from_stream`] and [`Vocab::create_fake`] force a
//!   [`crate::backends::DefaultVocab`], the only backend that supports them.
//!
//! Once bound, the backend never changes. Binding needs ``&mut self``,
//! so first use is serialized by the borrow checker.
//!
//! ## Provisioning
//!
//! ```rust,no_run
//! use vocabkit::{Vocab, VocabOptions};
//!
//! fn example() -> vocabkit::VocabResult<()> {
//!     let mut vocab = Vocab::new(VocabOptions::default(), 0);
//!
//!     // Finds "corpus.txt.json" or "corpus.txt.txt", creating the former if neither exists.
//!     let size = vocab.load_or_create("", "corpus.txt", 0)?;
//!
//!     let words = vocab.encode("hello world", true, true);
//!     assert_eq!(words.len(), 3);
//!     assert!(size >= 2);
//!     Ok(())
//! }
//! ```

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    backends::{BackendKind, VocabBackend},
    errors::VocabResult,
    factory::{create_default_vocab, create_vocab},
    options::VocabOptions,
    path_utils::append_suffix,
    types::{Word, Words},
};

/// Token vocabulary for one input stream.
#[derive(Debug)]
pub struct Vocab {
    options: VocabOptions,
    batch_index: usize,
    backend: Option<Box<dyn VocabBackend>>,
}

impl Vocab {
    /// Create an unresolved vocabulary.
    ///
    /// ## Arguments
    /// * `options` - handed unmodified to the backend constructors.
    /// * `batch_index` - the input stream this vocabulary serves.
    pub fn new(
        options: VocabOptions,
        batch_index: usize,
    ) -> Self {
        Self {
            options,
            batch_index,
            backend: None,
        }
    }

    /// The options bag.
    pub fn options(&self) -> &VocabOptions {
        &self.options
    }

    /// The input stream this vocabulary serves.
    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    /// True once a backend is bound.
    pub fn is_resolved(&self) -> bool {
        self.backend.is_some()
    }

    /// The bound backend, if any.
    pub fn backend(&self) -> Option<&dyn VocabBackend> {
        self.backend.as_deref()
    }

    /// Bind a backend through the factory, unless already bound.
    fn resolve_for(
        &mut self,
        path: &Path,
    ) -> &mut dyn VocabBackend {
        self.backend
            .get_or_insert_with(|| create_vocab(path, &self.options, self.batch_index))
            .as_mut()
    }

    /// Bind the default backend, unless already bound.
    fn resolve_default(&mut self) -> &mut dyn VocabBackend {
        self.backend.get_or_insert_with(create_default_vocab).as_mut()
    }

    fn resolved(&self) -> &dyn VocabBackend {
        match self.backend.as_deref() {
            Some(backend) => backend,
            None => panic!("vocabulary used before load or create"),
        }
    }

    /// Find, create, or load a vocabulary.
    ///
    /// * `vocab_path` empty: bind the default backend and look for
    ///   ``train_path + suffix``; if none exists, create
    ///   ``train_path + canonical_suffix`` from the corpus and load it.
    /// * `vocab_path` absent on disk: create it from the corpus, then load it.
    /// * `vocab_path` present: load it. Existing files are never rewritten.
    ///
    /// ## Arguments
    /// * `vocab_path` - the vocabulary file; may be empty.
    /// * `train_path` - the training corpus.
    /// * `max` - cap on the total size, reserved symbols included; 0 is unbounded.
    ///
    /// ## Returns
    /// The resulting vocabulary size.
    pub fn load_or_create(
        &mut self,
        vocab_path: impl AsRef<Path>,
        train_path: impl AsRef<Path>,
        max: usize,
    ) -> VocabResult<usize> {
        let vocab_path = vocab_path.as_ref();
        let train_path = train_path.as_ref();

        let size = if vocab_path.as_os_str().is_empty() {
            log::info!(
                "No vocabulary path given; trying to find default vocabulary based on data path {}",
                train_path.display()
            );

            let backend = self.resolve_default();
            let mut size = backend.find_and_load(train_path, max)?;
            if size == 0 {
                let path = append_suffix(train_path, backend.canonical_suffix());
                log::info!(
                    "No vocabulary found; creating {} from data path {}",
                    path.display(),
                    train_path.display()
                );
                backend.create(&path, train_path)?;
                size = backend.load(&path, max)?;
            }
            size
        } else {
            if !vocab_path.exists() {
                log::info!(
                    "Vocabulary {} does not exist; creating it",
                    vocab_path.display()
                );
                self.create(vocab_path, train_path)?;
            }
            self.load(vocab_path, max)?
        };

        log::info!(
            "[data] Setting vocabulary size for input {} to {size}",
            self.batch_index
        );
        Ok(size)
    }

    /// Load a vocabulary file, binding a backend for `path` on first use.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        max: usize,
    ) -> VocabResult<usize> {
        let path = path.as_ref();
        self.resolve_for(path).load(path, max)
    }

    /// Create a vocabulary file from a corpus, binding a backend for `vocab_path` on first use.
    pub fn create(
        &mut self,
        vocab_path: impl AsRef<Path>,
        train_path: impl AsRef<Path>,
    ) -> VocabResult<()> {
        let vocab_path = vocab_path.as_ref();
        self.resolve_for(vocab_path)
            .create(vocab_path, train_path.as_ref())
    }

    /// Create a vocabulary from a corpus stream.
    ///
    /// Binds the default backend on first use; only it can be built from streams.
    pub fn create_from_stream(
        &mut self,
        train: &mut dyn BufRead,
        vocab: &mut dyn Write,
        max_size: usize,
    ) -> VocabResult<()> {
        self.resolve_default()
            .create_from_stream(train, vocab, max_size)
    }

    /// Populate a placeholder vocabulary of just the reserved symbols.
    ///
    /// Binds the default backend on first use.
    pub fn create_fake(&mut self) -> VocabResult<()> {
        self.resolve_default().create_fake()
    }

    /// Look up a token's id; unknown tokens map to [`unk_id`](Self::unk_id).
    ///
    /// ## Panics
    /// Panics if no backend is bound; likewise for every query below.
    pub fn word(
        &self,
        token: &str,
    ) -> Word {
        self.resolved().word(token)
    }

    /// Look up the token for an id.
    pub fn token(
        &self,
        id: Word,
    ) -> Option<&str> {
        self.resolved().token(id)
    }

    /// Encode a line of text; see [`VocabBackend::encode`].
    pub fn encode(
        &self,
        line: &str,
        add_eos: bool,
        inference: bool,
    ) -> Words {
        self.resolved().encode(line, add_eos, inference)
    }

    /// Decode ids to a line of text; see [`VocabBackend::decode`].
    pub fn decode(
        &self,
        words: &[Word],
        ignore_eos: bool,
    ) -> VocabResult<String> {
        self.resolved().decode(words, ignore_eos)
    }

    /// The number of tokens.
    pub fn size(&self) -> usize {
        self.resolved().size()
    }

    /// The backend type tag.
    pub fn type_name(&self) -> &'static str {
        self.resolved().type_name()
    }

    /// The backend kind.
    pub fn kind(&self) -> BackendKind {
        self.resolved().kind()
    }

    /// The end-of-sequence id.
    pub fn eos_id(&self) -> Word {
        self.resolved().eos_id()
    }

    /// The unknown-token id.
    pub fn unk_id(&self) -> Word {
        self.resolved().unk_id()
    }
}
