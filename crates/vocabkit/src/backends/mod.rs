//! # Vocabulary Backends
//!
//! Interchangeable tokenization backends behind the [`VocabBackend`] trait:
//! * [`DefaultVocab`] - word-level; always available; constructible from streams.
//! * [`SubwordVocab`] - pair-merge subword segmentation; path-constructible only.

pub mod io;

mod default_vocab;
mod subword_trainer;
mod subword_vocab;
mod token_table;
mod vocab_backend;

#[doc(inline)]
pub use default_vocab::{DEFAULT_VOCAB_SUFFIXES, DefaultVocab};
#[doc(inline)]
pub use subword_trainer::{SubwordTrainer, SubwordTrainerOptions, WORD_START, initial_pieces};
#[doc(inline)]
pub use subword_vocab::{SUBWORD_VOCAB_SUFFIXES, SubwordVocab, UNK_SURFACE};
#[doc(inline)]
pub use token_table::TokenTable;
#[doc(inline)]
pub use vocab_backend::{BackendKind, VocabBackend};
