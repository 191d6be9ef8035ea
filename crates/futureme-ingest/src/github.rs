//! GitHub REST v3 activity provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::provider::ActivityProvider;
use crate::types::{CommitRecord, RepoInfo};

/// Default GitHub API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Page size for list endpoints, the API maximum.
const PER_PAGE: usize = 100;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`GithubProvider`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access token.
    pub token: String,
    /// API base URL, overridable for tests.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GithubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: GITHUB_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Activity provider backed by the GitHub REST API.
#[derive(Debug)]
pub struct GithubProvider {
    client: reqwest::Client,
    config: GithubConfig,
}

impl GithubProvider {
    pub fn new(config: GithubConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(IngestError::Config("github token is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IngestError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            // The GitHub API rejects requests without a User-Agent.
            .header("User-Agent", "futureme")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IngestError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ActivityProvider for GithubProvider {
    async fn list_repos(&self) -> Result<Vec<RepoInfo>> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let path = format!(
                "/user/repos?sort=updated&direction=desc&per_page={PER_PAGE}&page={page}"
            );
            let batch: Vec<WireRepo> = self.get_json(&path).await?;
            let done = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(WireRepo::into_repo_info));
            if done {
                break;
            }
            page += 1;
        }
        debug!(count = repos.len(), "listed repositories");
        Ok(repos)
    }

    async fn fetch_commits(&self, repo: &RepoInfo, max: usize) -> Result<Vec<CommitRecord>> {
        let mut records = Vec::new();
        let mut page = 1;
        while records.len() < max {
            let path = format!(
                "/repos/{}/commits?per_page={PER_PAGE}&page={page}",
                repo.full_name
            );
            let batch: Vec<WireCommit> = self.get_json(&path).await?;
            let done = batch.len() < PER_PAGE;
            for commit in batch {
                let record = commit.into_record(&repo.full_name);
                // Whitespace-only messages are unindexable and must
                // not count toward the caller's budget.
                if record.text.trim().is_empty() {
                    continue;
                }
                records.push(record);
                if records.len() >= max {
                    break;
                }
            }
            if done {
                break;
            }
            page += 1;
        }
        debug!(repo = %repo.full_name, count = records.len(), "fetched commits");
        Ok(records)
    }

    fn name(&self) -> &str {
        "github"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct WireRepo {
    full_name: String,
    updated_at: Option<DateTime<Utc>>,
}

impl WireRepo {
    fn into_repo_info(self) -> RepoInfo {
        RepoInfo {
            full_name: self.full_name,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct WireCommit {
    sha: String,
    commit: WireCommitDetail,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct WireCommitDetail {
    message: String,
    author: Option<WireCommitAuthor>,
}

#[derive(Deserialize)]
struct WireCommitAuthor {
    name: Option<String>,
    email: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl WireCommit {
    fn into_record(self, repo: &str) -> CommitRecord {
        let author = self.commit.author;
        CommitRecord {
            text: self.commit.message,
            repo: repo.to_string(),
            sha: self.sha,
            author_name: author
                .as_ref()
                .and_then(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            author_email: author
                .as_ref()
                .and_then(|a| a.email.clone())
                .unwrap_or_default(),
            date: author.and_then(|a| a.date),
            url: self.html_url,
        }
    }
}
