//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while collecting activity records.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Configuration error (missing token, bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-level failure talking to the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider API rejected the request.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to decode a provider response.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Serialization(err.to_string())
    }
}

/// Result alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
