//! Shared utilities for CLI commands.

use anyhow::Context;
use bt_core::Event;
use bt_core::duration::format_seconds;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Relative times such as "20 minutes ago" or "1 day ago".
const RELATIVE_TIME_PATTERN: &str = r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$";

/// Conservative bounds for relative time parsing (~100 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 100 * 365 * 24 * 60;

/// Parse a datetime string as either RFC 3339 or relative time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let relative = Regex::new(RELATIVE_TIME_PATTERN).context("invalid relative time pattern")?;
    let Some(caps) = relative.captures(s.trim()) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '20 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// The `HH:MM:SS` detail of a session running from `start` to `end`.
pub fn session_length(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format_seconds((end - start).num_seconds())
}

/// Formats an instant as local `YYYY-MM-DD HH:MM`.
pub fn local_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// One-line summary of an event for listings.
pub fn describe(event: &Event, tz: Tz) -> String {
    let mut line = format!("#{} {} {}", event.id, local_time(event.timestamp, tz), event.kind);
    if let Some(orientation) = event.orientation {
        line.push_str(&format!(" ({orientation})"));
    }
    if let Some(detail) = &event.detail {
        line.push_str(&format!(" {detail}"));
    }
    if let Some(weight) = event.weight {
        line.push_str(&format!(" {weight}kg"));
    }
    if let Some(height) = event.height {
        line.push_str(&format!(" {height}cm"));
    }
    if let Some(comments) = &event.comments {
        line.push_str(&format!(" - {comments}"));
    }
    line
}
