//! Session duration text.
//!
//! Completed feeding and sleep sessions carry their elapsed time as an
//! `HH:MM:SS` string in the `detail` column. This module is the only place
//! that text is read or written; everything that needs a session length
//! goes through [`parse_minutes`].

use chrono::Duration;

/// Detail marker for a session that has not been stopped yet.
pub const ONGOING: &str = "ongoing";

/// Parses `H:MM:SS` / `HH:MM:SS` into fractional minutes.
///
/// Returns `0.0` for `None`, [`ONGOING`], or any text that is not a
/// well-formed duration. Never fails.
#[allow(
    clippy::cast_precision_loss,
    reason = "session lengths are far below f64 precision limits"
)]
pub fn parse_minutes(text: Option<&str>) -> f64 {
    text.and_then(parse_seconds)
        .map_or(0.0, |seconds| seconds as f64 / 60.0)
}

/// Parses `H:MM:SS` / `HH:MM:SS` into whole seconds.
pub fn parse_seconds(text: &str) -> Option<u64> {
    let mut parts = text.trim().split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if hours.is_empty() || minutes.len() != 2 || seconds.len() != 2 {
        return None;
    }
    if ![hours, minutes, seconds]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Formats whole seconds as zero-padded `HH:MM:SS`.
///
/// Negative input is treated as zero.
pub fn format_seconds(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats an elapsed time as `"{m}m"` under an hour, else `"{h}h {m}m"`.
///
/// Negative durations are treated as 0m.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_minutes = elapsed.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
