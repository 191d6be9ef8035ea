//! Activity provider abstraction.
//!
//! [`ActivityProvider`] is the seam between collection logic and the
//! upstream source. The production implementation is
//! [`GithubProvider`](crate::github::GithubProvider); tests use
//! [`MockProvider`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CommitRecord, RepoInfo};

/// Source of repositories and their commit history.
#[async_trait]
pub trait ActivityProvider: Send + Sync {
    /// List repositories for the authenticated user, most recently
    /// updated first where the provider supports it.
    async fn list_repos(&self) -> Result<Vec<RepoInfo>>;

    /// Fetch up to `max` indexable commits for a repository, newest
    /// first.
    ///
    /// Commits whose message is empty or whitespace are skipped during
    /// conversion and do not count toward `max`, so a caller budgeting
    /// across repositories never loses budget to unindexable records.
    async fn fetch_commits(&self, repo: &RepoInfo, max: usize) -> Result<Vec<CommitRecord>>;

    /// Human-readable provider name for logging.
    fn name(&self) -> &str;
}

/// Shared reference to a provider.
pub type SharedProvider = Arc<dyn ActivityProvider>;

/// In-memory provider for tests.
pub struct MockProvider {
    repos: Vec<RepoInfo>,
    commits: std::collections::HashMap<String, Vec<CommitRecord>>,
    failing: std::collections::HashSet<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            repos: Vec::new(),
            commits: std::collections::HashMap::new(),
            failing: std::collections::HashSet::new(),
        }
    }

    /// Register a repository and its commits, newest first.
    pub fn with_repo(mut self, repo: RepoInfo, commits: Vec<CommitRecord>) -> Self {
        self.commits.insert(repo.full_name.clone(), commits);
        self.repos.push(repo);
        self
    }

    /// Register a repository whose commit fetch fails.
    pub fn with_failing_repo(mut self, repo: RepoInfo) -> Self {
        self.failing.insert(repo.full_name.clone());
        self.repos.push(repo);
        self
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityProvider for MockProvider {
    async fn list_repos(&self) -> Result<Vec<RepoInfo>> {
        Ok(self.repos.clone())
    }

    async fn fetch_commits(&self, repo: &RepoInfo, max: usize) -> Result<Vec<CommitRecord>> {
        if self.failing.contains(&repo.full_name) {
            return Err(crate::error::IngestError::Api {
                status: 409,
                message: format!("{} is unavailable", repo.full_name),
            });
        }
        let commits = self
            .commits
            .get(&repo.full_name)
            .cloned()
            .unwrap_or_default();
        Ok(commits
            .into_iter()
            .filter(|c| !c.text.trim().is_empty())
            .take(max)
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, text: &str) -> CommitRecord {
        CommitRecord {
            text: text.to_string(),
            repo: "me/a".to_string(),
            sha: sha.to_string(),
            author_name: "Me".to_string(),
            author_email: String::new(),
            date: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_commits_skips_empty_within_max() {
        let provider = MockProvider::new().with_repo(
            RepoInfo::new("me/a"),
            vec![
                commit("a1", "  "),
                commit("a2", "real"),
                commit("a3", ""),
                commit("a4", "also real"),
            ],
        );
        let records = provider
            .fetch_commits(&RepoInfo::new("me/a"), 2)
            .await
            .unwrap();
        let shas: Vec<&str> = records.iter().map(|r| r.sha.as_str()).collect();
        assert_eq!(shas, vec!["a2", "a4"]);
    }
}
