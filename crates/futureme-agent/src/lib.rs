//! Grounded conversation orchestration.
//!
//! Ties the other crates together: retrieval from the commit index,
//! session history, the future-self persona, and the chat backend.

pub mod agent;
pub mod error;
pub mod persona;

pub use agent::{AgentConfig, ChatOutcome, FutureAgent};
pub use error::{AgentError, Result};
pub use persona::{PersonaConfig, CONTEXT_PREAMBLE, DEFAULT_PERSONA_NAME, DEFAULT_YEARS_AHEAD};
