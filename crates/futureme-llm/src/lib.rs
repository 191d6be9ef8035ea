//! Chat-model and embedding clients for futureme.
//!
//! This crate provides the two capability seams the conversation engine
//! depends on:
//!
//! - [`ChatBackend`]: a black-box text-completion service. The shipped
//!   implementation is [`OpenAiBackend`], which speaks the OpenAI-compatible
//!   chat completions wire format (Groq by default).
//! - [`Embedder`]: converts text into dense vectors for the semantic index.
//!   [`HttpEmbedder`] calls an OpenAI-compatible embeddings endpoint;
//!   [`MockEmbedder`] produces deterministic vectors for tests.
//!
//! Both seams are trait objects so the orchestrator and index never know
//! which provider is behind them.

pub mod backend;
pub mod embeddings;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{ChatBackend, MockBackend, SharedBackend, with_retry};
pub use embeddings::{Embedder, HttpEmbedder, HttpEmbedderConfig, MockEmbedder, SharedEmbedder};
pub use error::{LlmError, Result};
pub use openai::{OpenAiBackend, OpenAiConfig, DEFAULT_GROQ_MODEL, GROQ_BASE_URL};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, Usage};
