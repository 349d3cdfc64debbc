//! GitHub commit-history adapter.
//!
//! This module fetches recent commits for a repository through the GitHub
//! REST API. Anonymous access works but is rate-limited aggressively, so an
//! optional token is passed through as a bearer credential when configured.
//!
//! # URL Pattern
//!
//! `https://api.github.com/repos/{owner}/{repo}/commits?per_page={limit}`,
//! requested with the `application/vnd.github.v3+json` accept header.
//!
//! # Failure Shape
//!
//! A rejected fetch (404 for a renamed repo, 403 when rate-limited) produces
//! **both** a visible diagnostic row and an error-map entry. The rendered
//! digest then shows "Failed to fetch commits: HTTP 404" in place of the
//! commit list instead of silently dropping the section.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::error::SourceError;
use crate::models::NormalizedItem;
use crate::rate_limit::RateLimiter;
use crate::sources::{ItemSource, SourceBatch};
use crate::utils::{parse_feed_date, truncate_title};

/// Rate-limiter key for all commit fetches.
pub const PROVIDER_KEY: &str = "github";

const API_ROOT: &str = "https://api.github.com";

/// Commit titles longer than this are cut with a trailing ellipsis.
const MAX_TITLE_CHARS: usize = 80;

/// Commit adapter over the GitHub REST API.
pub struct GithubCommits {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    token: Option<String>,
}

impl GithubCommits {
    pub fn new(http: reqwest::Client, limiter: Arc<RateLimiter>, token: Option<String>) -> Self {
        GithubCommits {
            http,
            limiter,
            token,
        }
    }

    fn commits_url(repo: &str, limit: usize) -> String {
        format!("{API_ROOT}/repos/{repo}/commits?per_page={limit}")
    }
}

impl ItemSource for GithubCommits {
    /// Fetch recent commits. `query` is the repository in `owner/repo` form.
    #[instrument(level = "info", skip_all, fields(repo = %query, limit))]
    async fn fetch_items(&self, query: &str, limit: usize) -> SourceBatch {
        self.limiter.acquire(PROVIDER_KEY).await;

        let mut request = self
            .http
            .get(Self::commits_url(query, limit))
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return SourceBatch::failed(e.into()),
        };
        let status = resp.status();
        if !status.is_success() {
            warn!(repo = query, status = status.as_u16(), "Commit fetch rejected");
            return SourceBatch {
                items: vec![diagnostic_item(status.as_u16())],
                error: Some(SourceError::Status {
                    status: status.as_u16(),
                }),
            };
        }

        match resp.json::<Vec<CommitEnvelope>>().await {
            Ok(commits) => {
                let items = normalize_commits(commits, limit);
                info!(count = items.len(), repo = query, "Fetched commits");
                SourceBatch::ok(items)
            }
            Err(e) => SourceBatch::failed(SourceError::Parse(e.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommitEnvelope {
    html_url: Option<String>,
    commit: Option<CommitBody>,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    message: Option<String>,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: Option<String>,
}

/// The single visible row standing in for a rejected commit fetch.
fn diagnostic_item(status: u16) -> NormalizedItem {
    NormalizedItem {
        title: format!("Failed to fetch commits: HTTP {status}"),
        link: "#".to_string(),
        summary: None,
        published: None,
        source: Some("github".to_string()),
    }
}

/// Normalize raw commit envelopes: first message line as the title, truncated
/// to a readable length. Envelopes missing a message or link are skipped.
fn normalize_commits(commits: Vec<CommitEnvelope>, limit: usize) -> Vec<NormalizedItem> {
    commits
        .into_iter()
        .take(limit)
        .filter_map(|envelope| {
            let body = envelope.commit?;
            let message = body.message?;
            let title = truncate_title(message.lines().next().unwrap_or_default(), MAX_TITLE_CHARS);
            Some(NormalizedItem {
                title,
                link: envelope.html_url?,
                summary: None,
                published: body
                    .author
                    .and_then(|a| a.date)
                    .as_deref()
                    .and_then(parse_feed_date),
                source: Some("github".to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(message: &str, url: &str, date: &str) -> CommitEnvelope {
        CommitEnvelope {
            html_url: Some(url.to_string()),
            commit: Some(CommitBody {
                message: Some(message.to_string()),
                author: Some(CommitAuthor {
                    date: Some(date.to_string()),
                }),
            }),
        }
    }

    #[test]
    fn test_normalize_takes_first_message_line() {
        let commits = vec![envelope(
            "Fix the flaky scheduler test\n\nLonger body explaining the race.",
            "https://github.com/acme/widget/commit/abc",
            "2026-08-22T10:00:00Z",
        )];
        let items = normalize_commits(commits, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Fix the flaky scheduler test");
        assert_eq!(items[0].link, "https://github.com/acme/widget/commit/abc");
        assert_eq!(items[0].source.as_deref(), Some("github"));
        assert!(items[0].published.is_some());
    }

    #[test]
    fn test_normalize_truncates_long_titles() {
        let long_line = "x".repeat(120);
        let commits = vec![envelope(
            &long_line,
            "https://github.com/acme/widget/commit/def",
            "2026-08-22T10:00:00Z",
        )];
        let items = normalize_commits(commits, 3);
        assert_eq!(items[0].title.chars().count(), 81);
        assert!(items[0].title.ends_with('…'));
    }

    #[test]
    fn test_normalize_short_title_keeps_exact_text() {
        let commits = vec![envelope(
            "Bump version",
            "https://github.com/acme/widget/commit/ghi",
            "2026-08-22T10:00:00Z",
        )];
        let items = normalize_commits(commits, 3);
        assert_eq!(items[0].title, "Bump version");
    }

    #[test]
    fn test_normalize_skips_incomplete_envelopes() {
        let commits = vec![
            CommitEnvelope {
                html_url: None,
                commit: Some(CommitBody {
                    message: Some("No link".to_string()),
                    author: None,
                }),
            },
            envelope(
                "Good commit",
                "https://github.com/acme/widget/commit/jkl",
                "2026-08-22T10:00:00Z",
            ),
        ];
        let items = normalize_commits(commits, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Good commit");
    }

    #[test]
    fn test_normalize_applies_limit() {
        let commits = (0..5)
            .map(|i| {
                envelope(
                    &format!("Commit {i}"),
                    &format!("https://github.com/acme/widget/commit/{i}"),
                    "2026-08-22T10:00:00Z",
                )
            })
            .collect();
        let items = normalize_commits(commits, 3);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_diagnostic_item_names_the_status() {
        let item = diagnostic_item(404);
        assert_eq!(item.title, "Failed to fetch commits: HTTP 404");
        assert_eq!(item.link, "#");
        assert_eq!(item.source.as_deref(), Some("github"));
    }

    #[test]
    fn test_commits_url() {
        assert_eq!(
            GithubCommits::commits_url("rust-lang/rust", 3),
            "https://api.github.com/repos/rust-lang/rust/commits?per_page=3"
        );
    }

    #[test]
    fn test_commit_envelope_decodes_api_shape() {
        let json = r#"[{
            "sha": "abc123",
            "html_url": "https://github.com/acme/widget/commit/abc123",
            "commit": {
                "message": "Add retry to the uploader\n\nDetails.",
                "author": {"name": "Dev", "email": "dev@acme.test", "date": "2026-08-21T08:30:00Z"}
            }
        }]"#;
        let commits: Vec<CommitEnvelope> = serde_json::from_str(json).unwrap();
        let items = normalize_commits(commits, 3);
        assert_eq!(items[0].title, "Add retry to the uploader");
    }
}
