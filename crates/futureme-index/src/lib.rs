//! Vector index and retrieval over commit records.
//!
//! [`CommitIndex`] stores records and their embeddings in SQLite via
//! sqlite-vec. [`build_index`] rebuilds an index from scratch,
//! [`Retriever`] answers top-k queries, and [`format_context`] turns
//! the hits into prompt-ready text.

pub mod build;
pub mod context;
pub mod error;
pub mod retrieve;
pub mod store;

pub use build::build_index;
pub use context::format_context;
pub use error::{IndexError, Result};
pub use retrieve::{Retriever, DEFAULT_TOP_K};
pub use store::{init_vector_extension, CommitIndex, ScoredRecord};
