//! Error types for the agent crate.

use thiserror::Error;

/// Errors from a single conversation turn.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Retrieval against the commit index failed.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] futureme_index::IndexError),

    /// The chat model call failed.
    #[error("model error: {0}")]
    Model(#[from] futureme_llm::LlmError),
}

/// Result alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
