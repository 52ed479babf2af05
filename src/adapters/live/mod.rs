//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod github;
pub mod llm;
pub mod sleeper;
pub mod webhook;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use github::GithubIssueSource;
pub use llm::OpenAiLlmClient;
pub use sleeper::TokioSleeper;
pub use webhook::FeishuWebhook;

use crate::error::RemoteError;

/// Maps a transport-level reqwest failure (connect, timeout, body read).
pub(crate) fn transport_error(context: &str, err: &reqwest::Error) -> RemoteError {
    RemoteError::Transient(format!("{context}: {err}"))
}
