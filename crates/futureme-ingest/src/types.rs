//! Record types produced by ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository owned by the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Fully-qualified name, e.g. `octocat/hello-world`.
    pub full_name: String,
    /// Last push or update time, when the provider reports one.
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepoInfo {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            updated_at: None,
        }
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }
}

/// A single commit converted into an indexable unit.
///
/// The commit message is the primary content; everything else is
/// provenance carried through to retrieval-time formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit message. Never empty after collection.
    pub text: String,
    /// Repository the commit belongs to.
    pub repo: String,
    /// Full commit SHA, used as the record identifier.
    pub sha: String,
    /// Author name, `Unknown` when the provider omits it.
    pub author_name: String,
    /// Author email, empty when the provider omits it.
    pub author_email: String,
    /// Author date, when available.
    pub date: Option<DateTime<Utc>>,
    /// Web URL for the commit, when available.
    pub url: Option<String>,
}

impl CommitRecord {
    /// Short form of the SHA for display, 7 characters like `git log`.
    pub fn short_sha(&self) -> &str {
        let end = self.sha.len().min(7);
        &self.sha[..end]
    }
}
