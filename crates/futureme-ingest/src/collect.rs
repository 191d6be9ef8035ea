//! Commit collection across repositories.
//!
//! [`collect_records`] walks the user's repositories most recently
//! updated first and gathers commit messages under a single global
//! cap. A repository whose history cannot be fetched is skipped with
//! a warning rather than failing the whole run.

use tracing::{info, warn};

use crate::error::Result;
use crate::provider::ActivityProvider;
use crate::types::CommitRecord;

/// Collect up to `global_max` non-empty commit records.
///
/// Repositories are visited newest-updated first, so when the cap is
/// smaller than the total history the most recent activity wins.
/// Commits whose message is empty or whitespace do not count toward
/// the cap; providers already skip them during conversion, and the
/// filter here keeps the invariant even for a provider that does not.
pub async fn collect_records(
    provider: &dyn ActivityProvider,
    global_max: usize,
) -> Result<Vec<CommitRecord>> {
    let mut repos = provider.list_repos().await?;
    // Providers usually return repos newest first already, but do not
    // rely on it. Repos with no update time sort last.
    repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let mut records: Vec<CommitRecord> = Vec::new();
    let mut skipped_repos = 0usize;

    for repo in &repos {
        let remaining = global_max.saturating_sub(records.len());
        if remaining == 0 {
            break;
        }
        let commits = match provider.fetch_commits(repo, remaining).await {
            Ok(commits) => commits,
            Err(err) => {
                warn!(repo = %repo.full_name, error = %err, "skipping repository");
                skipped_repos += 1;
                continue;
            }
        };
        for commit in commits {
            if commit.text.trim().is_empty() {
                continue;
            }
            records.push(commit);
            if records.len() >= global_max {
                break;
            }
        }
    }

    info!(
        provider = provider.name(),
        repos = repos.len(),
        skipped = skipped_repos,
        records = records.len(),
        "collected commit records"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use crate::types::RepoInfo;
    use chrono::{TimeZone, Utc};

    fn commit(repo: &str, sha: &str, text: &str) -> CommitRecord {
        CommitRecord {
            text: text.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
            author_name: "Me".to_string(),
            author_email: "me@example.com".to_string(),
            date: None,
            url: None,
        }
    }

    fn repo(name: &str, day: u32) -> RepoInfo {
        RepoInfo::new(name).with_updated_at(Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_global_cap_enforced() {
        let provider = MockProvider::new().with_repo(
            repo("me/a", 10),
            (0..5).map(|i| commit("me/a", &format!("a{i}"), "change")).collect(),
        );
        let records = collect_records(&provider, 3).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_recency_bias_exhausts_cap_on_newest_repo() {
        // Newest repo has enough commits to fill the cap, so the
        // older repo contributes nothing.
        let provider = MockProvider::new()
            .with_repo(
                repo("me/old", 1),
                vec![commit("me/old", "o1", "old work")],
            )
            .with_repo(
                repo("me/new", 20),
                (0..5).map(|i| commit("me/new", &format!("n{i}"), "new work")).collect(),
            );
        let records = collect_records(&provider, 3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.repo == "me/new"));
    }

    #[tokio::test]
    async fn test_cap_spans_repos_in_update_order() {
        let provider = MockProvider::new()
            .with_repo(
                repo("me/old", 1),
                vec![commit("me/old", "o1", "old"), commit("me/old", "o2", "older")],
            )
            .with_repo(
                repo("me/new", 20),
                vec![commit("me/new", "n1", "new"), commit("me/new", "n2", "newer")],
            );
        let records = collect_records(&provider, 3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].repo, "me/new");
        assert_eq!(records[1].repo, "me/new");
        assert_eq!(records[2].repo, "me/old");
    }

    #[tokio::test]
    async fn test_empty_messages_do_not_count() {
        let provider = MockProvider::new().with_repo(
            repo("me/a", 10),
            vec![
                commit("me/a", "a1", "real work"),
                commit("me/a", "a2", "   "),
                commit("me/a", "a3", ""),
                commit("me/a", "a4", "more work"),
            ],
        );
        let records = collect_records(&provider, 10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sha, "a1");
        assert_eq!(records[1].sha, "a4");
    }

    #[tokio::test]
    async fn test_whitespace_commit_does_not_eat_budget_from_newest_repo() {
        // A whitespace-only commit at the head of the newest repo must
        // not count toward the cap: all three remaining slots go to
        // that repo, and the older repo contributes nothing.
        let provider = MockProvider::new()
            .with_repo(repo("me/old", 1), vec![commit("me/old", "o1", "old work")])
            .with_repo(
                repo("me/new", 20),
                vec![
                    commit("me/new", "n0", "   "),
                    commit("me/new", "n1", "new one"),
                    commit("me/new", "n2", "new two"),
                    commit("me/new", "n3", "new three"),
                ],
            );
        let records = collect_records(&provider, 3).await.unwrap();
        let shas: Vec<&str> = records.iter().map(|r| r.sha.as_str()).collect();
        assert_eq!(shas, vec!["n1", "n2", "n3"]);
    }

    #[tokio::test]
    async fn test_failing_repo_is_skipped() {
        let provider = MockProvider::new()
            .with_failing_repo(repo("me/broken", 20))
            .with_repo(repo("me/ok", 10), vec![commit("me/ok", "k1", "fine")]);
        let records = collect_records(&provider, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repo, "me/ok");
    }

    #[tokio::test]
    async fn test_no_repos_yields_empty() {
        let provider = MockProvider::new();
        let records = collect_records(&provider, 10).await.unwrap();
        assert!(records.is_empty());
    }
}
