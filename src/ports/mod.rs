//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the pipeline and an external
//! system (time, delays, disk, issue tracker, LLM, chat webhook).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod issues;
pub mod llm;
pub mod sleeper;
pub mod webhook;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use issues::{Issue, IssueFuture, IssueSource, IssueState, RepositoryHandle};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};
pub use sleeper::{SleepFuture, Sleeper};
pub use webhook::{ChatWebhook, WebhookFuture, WebhookReply};
