//! Daily sleep windows.

use serde::{Deserialize, Serialize};

use crate::span::MinuteSpan;
use crate::types::ClockTime;

/// Nap or night sleep, decided by window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepKind {
    Nap,
    Night,
}

impl SleepKind {
    /// `Night` when the span reaches `night_threshold_minutes`, else `Nap`.
    pub const fn classify(span: MinuteSpan, night_threshold_minutes: u32) -> Self {
        if span.len() >= night_threshold_minutes {
            Self::Night
        } else {
            Self::Nap
        }
    }
}

/// A start/end pair of wall-clock times. The end may be on the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ClockRange {
    pub const fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    pub fn span(self) -> MinuteSpan {
        MinuteSpan::between(self.start, self.end)
    }
}

/// A representative daily sleep window, from history or from age norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: ClockTime,
    pub end: ClockTime,
    pub kind: SleepKind,
}

impl Window {
    /// Classifies a clock range by its wrap-aware length.
    pub fn classify(range: ClockRange, night_threshold_minutes: u32) -> Self {
        Self {
            start: range.start,
            end: range.end,
            kind: SleepKind::classify(range.span(), night_threshold_minutes),
        }
    }

    pub const fn range(self) -> ClockRange {
        ClockRange::new(self.start, self.end)
    }

    pub fn duration_minutes(self) -> u32 {
        self.range().span().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> ClockRange {
        ClockRange::new(start.parse().unwrap(), end.parse().unwrap())
    }

    #[test]
    fn five_hours_is_night() {
        let window = Window::classify(range("22:00", "03:00"), 300);
        assert_eq!(window.kind, SleepKind::Night);
        assert_eq!(window.duration_minutes(), 300);
    }

    #[test]
    fn just_under_threshold_is_nap() {
        let window = Window::classify(range("12:00", "16:59"), 300);
        assert_eq!(window.kind, SleepKind::Nap);
    }

    #[test]
    fn window_serializes_clock_strings() {
        let window = Window::classify(range("19:30", "07:00"), 300);
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"start":"19:30","end":"07:00","kind":"Night"}"#);
    }
}
