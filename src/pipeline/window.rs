//! Active-hours gate evaluated at the start of every cycle.

use chrono::NaiveTime;

/// Wall-clock window `[start, end)` during which cycles are allowed to run.
///
/// A window whose start is after its end wraps midnight (`22:00`-`06:00`).
/// Equal bounds mean the window is always open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ActiveWindow {
    /// Creates a window from its bounds.
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// A window that never closes.
    #[must_use]
    pub fn always() -> Self {
        Self { start: NaiveTime::MIN, end: NaiveTime::MIN }
    }

    /// Parses `HH:MM` (seconds are accepted too).
    #[must_use]
    pub fn parse_time(value: &str) -> Option<NaiveTime> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
    }

    /// Inclusive start.
    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Exclusive end.
    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns `true` when `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.start == self.end {
            return true;
        }
        if self.start < self.end {
            self.start <= now && now < self.end
        } else {
            now >= self.start || now < self.end
        }
    }
}
