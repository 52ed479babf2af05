//! Replaying adapter for the `IssueSource` port.

use serde_json::json;

use super::{lock, SharedReplayer};
use crate::ports::issues::{IssueFuture, IssueSource, RepositoryHandle};

/// Serves recorded issue listings from a cassette.
pub struct ReplayingIssueSource {
    replayer: SharedReplayer,
}

impl ReplayingIssueSource {
    /// Create a replaying issue source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl IssueSource for ReplayingIssueSource {
    fn list_open_issues<'a>(&'a self, repo: &'a RepositoryHandle) -> IssueFuture<'a> {
        let result = lock(&self.replayer).next_result(
            "issues",
            "list_open_issues",
            &json!({ "repo": repo.as_str() }),
        );
        Box::pin(async move { result })
    }
}
