//! Issue fetcher: lists a repository's open issues and picks the new ones.

use crate::error::RemoteError;
use crate::ports::{Issue, IssueSource, IssueState, RepositoryHandle};
use crate::store::SeenSet;

/// Unseen open issues of one repository, split by the max-known threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBatch {
    /// Repository the batch belongs to.
    pub repository: RepositoryHandle,
    /// Issues above the max-known number, ascending. These get notified.
    pub eligible: Vec<Issue>,
    /// Unseen numbers at or below max-known, ascending. These are recorded
    /// as seen without a notification.
    pub backfill: Vec<u64>,
}

/// Queries the issue source and filters its listing against a seen-set.
pub struct IssueFetcher<'a> {
    source: &'a dyn IssueSource,
}

impl<'a> IssueFetcher<'a> {
    /// Creates a fetcher over the given source.
    #[must_use]
    pub fn new(source: &'a dyn IssueSource) -> Self {
        Self { source }
    }

    /// Fetches the open issues of `repo` that are absent from `seen`.
    ///
    /// Read-only: the caller decides when to update the seen-set.
    ///
    /// # Errors
    ///
    /// Returns the source's error; nothing is filtered in that case.
    pub async fn fetch_new(
        &self,
        repo: &RepositoryHandle,
        seen: &SeenSet,
    ) -> Result<FetchBatch, RemoteError> {
        let issues = self.source.list_open_issues(repo).await?;
        Ok(select_new(repo, issues, seen))
    }
}

/// Splits a listing into eligible and backfill issues.
///
/// Closed and already-seen issues are dropped. An issue is eligible only
/// when its number is strictly greater than the highest number ever seen;
/// an empty seen-set means the repository is polled for the first time and
/// everything currently open becomes the baseline.
#[must_use]
pub fn select_new(repo: &RepositoryHandle, mut issues: Vec<Issue>, seen: &SeenSet) -> FetchBatch {
    issues.retain(|issue| issue.state == IssueState::Open && !seen.contains(issue.number));
    issues.sort_by_key(|issue| issue.number);
    issues.dedup_by_key(|issue| issue.number);

    let threshold = seen.max_known();
    let mut eligible = Vec::new();
    let mut backfill = Vec::new();
    for issue in issues {
        match threshold {
            Some(max) if issue.number > max => eligible.push(issue),
            _ => backfill.push(issue.number),
        }
    }

    FetchBatch { repository: repo.clone(), eligible, backfill }
}
