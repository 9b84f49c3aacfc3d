//! Care events as recorded in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::{self, ONGOING};
use crate::event_kind::{EventKind, Orientation};

/// An immutable entry in the care log.
///
/// A session event (feeding or sleep) is ongoing iff its `detail` is
/// `"ongoing"`; ongoing events have no `end_timestamp`. Once stopped, the
/// session stores both the absolute `end_timestamp` and the elapsed time as
/// `HH:MM:SS` text in `detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub kind: EventKind,
    /// Free text, `"ongoing"`, or an `HH:MM:SS` duration for completed sessions.
    #[serde(default)]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub end_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub feed_id: Option<i64>,
    /// Weight in kilograms, for growth readings.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in centimetres, for growth readings.
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Event {
    /// Creates an event with only the required fields set.
    pub const fn new(id: i64, kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            detail: None,
            timestamp,
            end_timestamp: None,
            orientation: None,
            feed_id: None,
            weight: None,
            height: None,
            comments: None,
        }
    }

    /// Whether this session has not been stopped yet.
    pub fn is_ongoing(&self) -> bool {
        self.detail.as_deref() == Some(ONGOING)
    }

    /// Elapsed minutes as recorded in the `detail` text.
    ///
    /// Zero when the text is missing, ongoing or malformed.
    pub fn detail_minutes(&self) -> f64 {
        duration::parse_minutes(self.detail.as_deref())
    }

    /// Elapsed time between start and recorded end.
    ///
    /// `None` for ongoing sessions and for completed ones missing an end.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        if self.is_ongoing() {
            return None;
        }
        self.end_timestamp.map(|end| end - self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn ongoing_is_detected_from_detail() {
        let mut event = Event::new(1, EventKind::Feeding, at(9, 0));
        assert!(!event.is_ongoing());

        event.detail = Some(ONGOING.to_string());
        assert!(event.is_ongoing());
        assert_eq!(event.elapsed(), None);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact minute values")]
    fn completed_session_exposes_both_duration_views() {
        let mut event = Event::new(2, EventKind::Sleep, at(13, 0));
        event.end_timestamp = Some(at(14, 30));
        event.detail = Some("01:30:00".to_string());

        assert_eq!(event.detail_minutes(), 90.0);
        assert_eq!(event.elapsed(), Some(chrono::Duration::minutes(90)));
    }

    #[test]
    fn completed_session_without_end_has_no_elapsed() {
        let mut event = Event::new(3, EventKind::Sleep, at(13, 0));
        event.detail = Some("01:30:00".to_string());
        assert_eq!(event.elapsed(), None);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let mut event = Event::new(4, EventKind::Growth, at(8, 0));
        event.weight = Some(4.2);
        event.height = Some(55.5);

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn event_rejects_unknown_kind() {
        let json = r#"{
            "id": 1,
            "kind": "Bath",
            "timestamp": "2025-01-01T00:00:00Z"
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
