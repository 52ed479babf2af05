//! Replaying adapter for the Clock port.

use chrono::{DateTime, NaiveTime, Utc};

use super::{lock, SharedReplayer};
use crate::ports::clock::Clock;

/// Replays recorded clock values from a cassette.
///
/// `now` reads `clock::now` (RFC 3339) and `local_time` reads
/// `clock::local_time` (`HH:MM:SS`).
pub struct ReplayingClock {
    replayer: SharedReplayer,
}

impl ReplayingClock {
    /// Creates a new replaying clock from a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> DateTime<Utc> {
        lock(&self.replayer).next_value("clock", "now")
    }

    fn local_time(&self) -> NaiveTime {
        lock(&self.replayer).next_value("clock", "local_time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::tests::shared;
    use serde_json::json;

    #[test]
    fn replaying_clock_serves_recorded_time() {
        let replayer = shared(vec![("clock", "now", json!(null), json!("2024-06-15T10:30:00Z"))]);
        let clock = ReplayingClock::new(replayer);
        assert_eq!(clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }

    #[test]
    fn now_and_local_time_have_separate_streams() {
        let replayer = shared(vec![
            ("clock", "local_time", json!(null), json!("09:15:00")),
            ("clock", "now", json!(null), json!("2024-01-01T00:00:00Z")),
            ("clock", "now", json!(null), json!("2024-01-01T00:01:00Z")),
        ]);
        let clock = ReplayingClock::new(replayer);

        let t1 = clock.now();
        let t2 = clock.now();
        assert!(t2 > t1);
        assert_eq!(clock.local_time(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
    }
}
