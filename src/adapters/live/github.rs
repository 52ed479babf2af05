//! Live adapter for the `IssueSource` port using the GitHub REST API.

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::transport_error;
use crate::config::GithubConfig;
use crate::error::{truncate, RemoteError};
use crate::ports::issues::{Issue, IssueFuture, IssueSource, IssueState, RepositoryHandle};

const PER_PAGE: usize = 100;
const MAX_PAGES: u32 = 50;
const API_VERSION: &str = "2022-11-28";

/// Lists open issues through `GET /repos/{owner}/{name}/issues`.
pub struct GithubIssueSource {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubIssueSource {
    /// Creates a client for the configured API base.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build GitHub client: {e}"))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    async fn fetch_page(
        &self,
        repo: &RepositoryHandle,
        page: u32,
    ) -> Result<Vec<GithubIssue>, RemoteError> {
        let url = format!("{}/repos/{}/{}/issues", self.api_base, repo.owner(), repo.name());
        let per_page = PER_PAGE.to_string();
        let page = page.to_string();
        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, concat!("issue-herald/", env!("CARGO_PKG_VERSION")))
            .query(&[
                ("state", "open"),
                ("sort", "created"),
                ("direction", "asc"),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response =
            request.send().await.map_err(|e| transport_error("GitHub request failed", &e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error("Failed to read GitHub response", &e))?;

        if !status.is_success() {
            return Err(classify_status(status, &headers, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            RemoteError::MalformedResponse(format!(
                "unexpected GitHub issue listing ({e}): {}",
                truncate(&text, 200)
            ))
        })
    }
}

fn classify_status(status: StatusCode, headers: &HeaderMap, body: &str) -> RemoteError {
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim() == "0"));
    if rate_limited {
        return RemoteError::Transient(format!(
            "GitHub rate limit exceeded (HTTP {})",
            status.as_u16()
        ));
    }
    RemoteError::from_status(status.as_u16(), body)
}

#[derive(Deserialize)]
struct GithubIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    state: IssueState,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl GithubIssue {
    fn into_issue(self, repo: &RepositoryHandle) -> Option<Issue> {
        if self.pull_request.is_some() {
            return None;
        }
        Some(Issue {
            repository: repo.clone(),
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
            state: self.state,
        })
    }
}

impl IssueSource for GithubIssueSource {
    fn list_open_issues<'a>(&'a self, repo: &'a RepositoryHandle) -> IssueFuture<'a> {
        Box::pin(async move {
            let mut issues = Vec::new();
            for page in 1..=MAX_PAGES {
                let batch = self.fetch_page(repo, page).await?;
                let full_page = batch.len() == PER_PAGE;
                issues.extend(batch.into_iter().filter_map(|raw| raw.into_issue(repo)));
                if !full_page {
                    return Ok(issues);
                }
            }
            tracing::warn!(repo = %repo, pages = MAX_PAGES, "issue listing truncated at page cap");
            Ok(issues)
        })
    }
}
