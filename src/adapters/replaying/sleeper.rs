//! Sleeper that returns immediately.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::sleeper::{SleepFuture, Sleeper};

/// Records each requested pause and returns without waiting.
#[derive(Default)]
pub struct InstantSleeper {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl InstantSleeper {
    /// Handle to the list of requested pauses, in call order.
    #[must_use]
    pub fn requested(&self) -> Arc<Mutex<Vec<Duration>>> {
        Arc::clone(&self.requested)
    }
}

impl Sleeper for InstantSleeper {
    fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(duration);
        }
        Box::pin(std::future::ready(()))
    }
}
