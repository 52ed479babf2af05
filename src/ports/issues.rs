//! Issue source port for listing a repository's open issues.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Boxed future type alias used by [`IssueSource`] to keep the trait dyn-compatible.
pub type IssueFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Issue>, RemoteError>> + Send + 'a>>;

/// A repository identifier of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryHandle(String);

/// Reason a string was rejected as a [`RepositoryHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHandle(pub String);

impl fmt::Display for InvalidHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid repository {:?}: expected owner/name", self.0)
    }
}

impl Error for InvalidHandle {}

impl RepositoryHandle {
    /// Owner half of the handle.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// Repository-name half of the handle.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, name)| name)
    }

    /// The handle as written, `owner/name`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepositoryHandle {
    type Err = InvalidHandle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let valid = match trimmed.split_once('/') {
            Some((owner, name)) => {
                !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/')
                    && !trimmed.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidHandle(value.to_string()))
        }
    }
}

impl TryFrom<String> for RepositoryHandle {
    type Error = InvalidHandle;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryHandle> for String {
    fn from(value: RepositoryHandle) -> Self {
        value.0
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an issue is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// The issue is open.
    Open,
    /// The issue has been closed.
    Closed,
}

/// Snapshot of one issue as fetched from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Repository the issue belongs to.
    pub repository: RepositoryHandle,
    /// Issue number, unique within the repository.
    pub number: u64,
    /// The issue title.
    pub title: String,
    /// The issue body; empty when the author left it blank.
    pub body: String,
    /// Browser URL of the issue.
    pub url: String,
    /// Open or closed.
    pub state: IssueState,
}

/// Lists issues from an upstream tracker.
///
/// Abstracting the tracker allows deterministic replay and testing
/// without touching a real issue tracker API.
pub trait IssueSource: Send + Sync {
    /// Lists the currently open issues of `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails (network, auth, rate-limit, etc.).
    fn list_open_issues<'a>(&'a self, repo: &'a RepositoryHandle) -> IssueFuture<'a>;
}
