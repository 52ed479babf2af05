//! Sleeper port for pacing delays between remote calls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`Sleeper::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Waits for a fixed duration.
///
/// Pacing delays exist to stay under upstream and downstream rate limits.
/// Routing them through a port lets tests observe the requested delays
/// without actually waiting.
pub trait Sleeper: Send + Sync {
    /// Suspends the caller for `duration`.
    fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}
