//! # Error Types

use std::path::PathBuf;

use crate::types::Word;

/// Errors from vocabkit operations.
#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    /// The backend does not implement the requested operation.
    #[error("{backend} does not support {operation}")]
    Unsupported {
        /// The backend type name.
        backend: &'static str,

        /// The refused operation.
        operation: &'static str,
    },

    /// Refusing to overwrite an existing vocabulary file.
    #[error("vocabulary file {} exists; not overwriting", path.display())]
    AlreadyExists {
        /// The existing file.
        path: PathBuf,
    },

    /// A required reserved symbol is missing from a loaded vocabulary.
    #[error("vocabulary is missing the reserved symbol {symbol:?}")]
    MissingReservedSymbol {
        /// The missing symbol.
        symbol: &'static str,
    },

    /// Loaded token ids do not cover ``[0, size)``.
    #[error("vocabulary ids are not dense: id {missing} is missing (size {size})")]
    SparseIds {
        /// The first missing id.
        missing: usize,

        /// The number of loaded entries.
        size: usize,
    },

    /// Vocabulary data is inconsistent.
    #[error("malformed vocabulary: {0}")]
    Malformed(String),

    /// A token id is not part of the vocabulary.
    #[error("token id {0} is out of range")]
    InvalidId(Word),

    /// The options bag cannot satisfy the request.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The training corpus contains no tokens.
    #[error("training corpus {} is empty", path.display())]
    EmptyCorpus {
        /// The corpus path.
        path: PathBuf,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Parse error (base64, integer, etc.)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for vocabkit operations.
pub type VocabResult<T> = core::result::Result<T, VocabError>;
