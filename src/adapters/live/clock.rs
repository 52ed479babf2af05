//! Live clock using the system clock.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Live clock that returns the real current time.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn returns_current_time() {
        let clock = LiveClock;
        let before = Utc::now();
        let now = clock.now();
        let after = Utc::now();

        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn local_time_follows_local_timezone() {
        let clock = LiveClock;
        let expected = Local::now().time();
        let local = clock.local_time();

        let drift = (local - expected).num_seconds().abs();
        assert!(drift <= 1 || drift >= 86_399, "drift was {drift}s");
    }
}
