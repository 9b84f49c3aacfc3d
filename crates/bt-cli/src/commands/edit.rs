//! Edit command for correcting a recorded event.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::EventKind;
use bt_db::{Database, NewEvent};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::log::LogArgs;
use super::util::{describe, parse_datetime, session_length};

/// Overwrites the given fields of event `id`, keeping the rest.
///
/// Moving either end of a finished session recomputes its length unless
/// `--detail` is also given.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: i64,
    kind: Option<EventKind>,
    args: LogArgs,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    let Some(existing) = db.get_event(id).context("failed to read event")? else {
        anyhow::bail!("event not found: #{id}");
    };

    let timestamp = match args.at.as_deref() {
        Some(at) => parse_datetime(at, now)?,
        None => existing.timestamp,
    };
    let end_timestamp = match args.end.as_deref() {
        Some(end) => Some(parse_datetime(end, now)?),
        None => existing.end_timestamp,
    };

    let retimed = args.at.is_some() || args.end.is_some();
    let detail = match (args.detail, end_timestamp) {
        (Some(detail), _) => Some(detail),
        (None, Some(end)) if retimed => Some(session_length(timestamp, end)),
        (None, _) => existing.detail,
    };

    let change = NewEvent {
        kind: kind.unwrap_or(existing.kind),
        detail,
        timestamp: Some(timestamp),
        end_timestamp,
        orientation: args.by.or(existing.orientation),
        feed_id: existing.feed_id,
        weight: args.weight.or(existing.weight),
        height: args.height.or(existing.height),
        comments: args.comment.or(existing.comments),
    };
    let Some(updated) = db.update_event(id, change).context("failed to update event")? else {
        anyhow::bail!("event not found: #{id}");
    };

    writeln!(writer, "Updated {}", describe(&updated, tz))?;
    Ok(())
}
