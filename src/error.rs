//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::vocab::TokenId;

/// Convenient result type used throughout the crate.
pub type Result<T, E = G2pError> = std::result::Result<T, E>;

/// Domain-specific error describing failures while reading corpora, loading vocabularies,
/// or validating configuration.
///
/// Unmapped characters and out-of-vocabulary tokens are deliberately absent: the transducer
/// passes unknown characters through and the mapper substitutes `<unk>`.
#[derive(Debug, Error)]
pub enum G2pError {
    /// A corpus record is missing its `phonemes` or `graphemes` field or is not valid JSON.
    #[error("invalid corpus record at {path:?} line {line}: {reason}")]
    InvalidRecord {
        /// File the record was read from, if any.
        path: Option<PathBuf>,
        /// One-based line number of the offending record.
        line: usize,
        /// Parser message describing the defect.
        reason: String,
    },
    /// A persisted vocabulary could not be read or failed validation.
    #[error("failed to load vocabulary from {path:?}: {reason}")]
    VocabularyLoad {
        /// Artifact path associated with the failure.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
    /// An id passed to the inverse mapper lies outside `[0, vocab_size)`.
    #[error("token id {id} is outside the vocabulary of size {vocab_size}")]
    TokenIdOutOfRange {
        /// Offending id.
        id: TokenId,
        /// Size of the vocabulary consulted.
        vocab_size: usize,
    },
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Error bubbled up from the `tokenizers` crate.
    #[error("huggingface tokenizers error: {0}")]
    Tokenizers(String),
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tokenizers::Error> for G2pError {
    fn from(err: tokenizers::Error) -> Self {
        Self::Tokenizers(err.to_string())
    }
}

impl From<serde_json::Error> for G2pError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl G2pError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    /// Helper constructor for vocabulary load failures.
    pub fn vocabulary_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::VocabularyLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
