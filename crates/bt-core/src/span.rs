//! Wrap-aware minute-of-day intervals.
//!
//! A sleep that starts at 20:00 and ends at 07:00 crosses midnight. Every
//! place that turns a pair of clock readings into a length goes through
//! [`MinuteSpan`] so the midnight correction is applied exactly once.

use crate::types::ClockTime;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A start/end pair of minutes of day where `end` has been lifted past
/// midnight when it precedes `start`.
///
/// Invariant: `start < 1440` and `start <= end < start + 1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MinuteSpan {
    start: u32,
    end: u32,
}

impl MinuteSpan {
    /// Builds a span from two minutes of day, adding a day to `end` if it
    /// falls before `start`.
    #[must_use]
    pub const fn wrapping(start_minute: u32, end_minute: u32) -> Self {
        let start = start_minute % MINUTES_PER_DAY;
        let end = end_minute % MINUTES_PER_DAY;
        let end = if end < start { end + MINUTES_PER_DAY } else { end };
        Self { start, end }
    }

    /// Builds a span between two wall-clock times.
    #[must_use]
    pub fn between(start: ClockTime, end: ClockTime) -> Self {
        Self::wrapping(start.minute_of_day(), end.minute_of_day())
    }

    /// Start minute of day, in `0..1440`.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// End minute, possibly `>= 1440` when the span crosses midnight.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Length of the span in minutes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end == self.start
    }

    #[must_use]
    pub const fn crosses_midnight(self) -> bool {
        self.end >= MINUTES_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_day_span_is_unchanged() {
        let span = MinuteSpan::wrapping(540, 600);
        assert_eq!(span.start(), 540);
        assert_eq!(span.end(), 600);
        assert_eq!(span.len(), 60);
        assert!(!span.crosses_midnight());
    }

    #[test]
    fn overnight_span_lifts_end_past_midnight() {
        let span = MinuteSpan::wrapping(20 * 60, 7 * 60);
        assert_eq!(span.end(), 7 * 60 + MINUTES_PER_DAY);
        assert_eq!(span.len(), 11 * 60);
        assert!(span.crosses_midnight());
    }

    #[test]
    fn equal_endpoints_are_empty() {
        let span = MinuteSpan::wrapping(300, 300);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn between_clock_times() {
        let start: ClockTime = "19:30".parse().unwrap();
        let end: ClockTime = "07:00".parse().unwrap();
        assert_eq!(MinuteSpan::between(start, end).len(), 690);
    }
}
