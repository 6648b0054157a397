//! # `vocabkit` Token Vocabulary Manager
//!
//! Maps textual tokens to integer ids for a downstream model,
//! across interchangeable tokenization backends.
//!
//! See:
//! * [`Vocab`] - the facade; binds a backend on first use and
//!   finds, creates, or loads vocabularies from training corpora.
//! * [`backends`] - the [`backends::VocabBackend`] contract and its implementations:
//!   * [`backends::DefaultVocab`] - word-level, always available.
//!   * [`backends::SubwordVocab`] - pair-merge subword segmentation.
//! * [`factory`] - backend selection by vocabulary path.
//! * [`VocabOptions`] - the options bag handed to backends.
//!
//! ## Crate Features
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``.
//!
//! This is done by the ``types::VK{HashMap,HashSet}`` type alias machinery.
//!
//! ## Provisioning A Vocabulary
//!
//! ```rust,no_run
//! use vocabkit::{Vocab, VocabOptions};
//!
//! fn example() -> vocabkit::VocabResult<()> {
//!     // "*.bpe" paths select the subword backend; it trains to `dim_vocabs[batch_index]`.
//!     let options = VocabOptions::default().with_dim_vocabs([8000]);
//!
//!     let mut vocab = Vocab::new(options, 0);
//!     vocab.load_or_create("model.bpe", "corpus.txt", 0)?;
//!
//!     let words = vocab.encode("hello world", true, true);
//!     let text = vocab.decode(&words, true)?;
//!     assert_eq!(text, "hello world");
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod backends;
pub mod corpus;
pub mod errors;
pub mod factory;
pub mod options;
pub mod path_utils;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use backends::{BackendKind, VocabBackend};
#[doc(inline)]
pub use errors::{VocabError, VocabResult};
#[doc(inline)]
pub use options::VocabOptions;
#[doc(inline)]
pub use types::{EOS_STR, RESERVED_SYMBOL_COUNT, UNK_STR, Word, Words};
#[doc(inline)]
pub use vocab::Vocab;
