//! Error types for the index crate.

use thiserror::Error;

/// Errors produced by index build and retrieval.
#[derive(Error, Debug)]
pub enum IndexError {
    /// SQLite-level failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Embedding provider failure.
    #[error("embedding error: {0}")]
    Embedding(#[from] futureme_llm::LlmError),

    /// A vector did not match the index dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
