//! Clock port for obtaining the current time.

use chrono::{DateTime, Local, NaiveTime, Utc};

/// Provides the current time.
///
/// Abstracting time access allows deterministic replay by substituting
/// a fixed or recorded clock during tests and cassette playback.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current wall-clock time of day in the local timezone.
    ///
    /// The active-hours window is compared against this value.
    fn local_time(&self) -> NaiveTime {
        self.now().with_timezone(&Local).time()
    }
}
