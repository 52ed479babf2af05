//! The polling-dedupe-notify pipeline.

pub mod fetcher;
pub mod notifier;
pub mod orchestrator;
pub mod scheduler;
pub mod sign;
pub mod summarizer;
pub mod window;

pub use fetcher::{FetchBatch, IssueFetcher};
pub use notifier::{NotificationPayload, Notifier};
pub use orchestrator::{CycleOptions, CycleReport, CycleStats, Pipeline};
pub use summarizer::{Summarizer, Summary};
pub use window::ActiveWindow;
