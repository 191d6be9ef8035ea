//! GitHub activity ingestion.
//!
//! Turns a user's recent commit history into [`CommitRecord`]s ready
//! for indexing. The [`ActivityProvider`] trait abstracts the upstream
//! API; [`collect_records`] applies the global cap, recency ordering,
//! and empty-message filtering.

pub mod collect;
pub mod error;
pub mod github;
pub mod provider;
pub mod types;

pub use collect::collect_records;
pub use error::{IngestError, Result};
pub use github::{GithubConfig, GithubProvider, GITHUB_API_URL};
pub use provider::{ActivityProvider, MockProvider, SharedProvider};
pub use types::{CommitRecord, RepoInfo};
