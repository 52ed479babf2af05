//! Typed failures shared by the pipeline stages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single call to one of the remote services (issue source,
/// generation backend, chat webhook).
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteError {
    /// Network, timeout, rate-limit or server-side failure. Retried next cycle.
    #[error("transient failure: {0}")]
    Transient(String),
    /// Credentials or signature were rejected.
    #[error("authorization rejected: {0}")]
    Authorization(String),
    /// The service answered with a payload we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// Returns `true` for credential/signature rejections.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Classifies an HTTP status that was not a success.
    ///
    /// 401 and 403 are authorization failures, everything else (429, 5xx,
    /// unexpected 4xx) is treated as transient.
    #[must_use]
    pub fn from_status(status: u16, detail: &str) -> Self {
        let message = format!("HTTP {status}: {}", truncate(detail, 200));
        match status {
            401 | 403 => Self::Authorization(message),
            _ => Self::Transient(message),
        }
    }
}

/// Failure reading or writing the durable seen-set.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but could not be read.
    #[error("failed to read seen-set {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying cause.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Appending a number failed; the record is not durable.
    #[error("failed to append to seen-set {}: {source}", path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying cause.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A line that is not a positive issue number.
    #[error("corrupt seen-set {} line {line}: {value:?}", path.display())]
    Corrupt {
        /// File containing the bad line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Offending content.
        value: String,
    },
}

/// Shortens `text` to at most `max` characters for log and error messages.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_classifies_auth_codes() {
        assert!(RemoteError::from_status(401, "bad token").is_authorization());
        assert!(RemoteError::from_status(403, "forbidden").is_authorization());
    }

    #[test]
    fn from_status_treats_everything_else_as_transient() {
        for status in [404, 429, 500, 502] {
            let err = RemoteError::from_status(status, "");
            assert!(matches!(err, RemoteError::Transient(_)), "status {status}");
        }
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
