//! Log command for recording a single event.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{EventKind, Orientation};
use bt_db::{Database, NewEvent};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::util::{describe, parse_datetime, session_length};

/// Fields given on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogArgs {
    pub by: Option<Orientation>,
    pub detail: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub comment: Option<String>,
    pub at: Option<String>,
    pub end: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    kind: EventKind,
    args: LogArgs,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    let timestamp = args
        .at
        .as_deref()
        .map(|at| parse_datetime(at, now))
        .transpose()?;
    let end_timestamp = args
        .end
        .as_deref()
        .map(|end| parse_datetime(end, now))
        .transpose()?;

    // A finished session without explicit detail records its length.
    let detail = args.detail.or_else(|| {
        end_timestamp.map(|end| session_length(timestamp.unwrap_or(now), end))
    });

    let event = NewEvent {
        detail,
        timestamp,
        end_timestamp,
        orientation: args.by,
        weight: args.weight,
        height: args.height,
        comments: args.comment,
        ..NewEvent::new(kind)
    };
    let event = db.insert_event(event, now).context("failed to record event")?;

    writeln!(writer, "Logged {}", describe(&event, tz))?;
    Ok(())
}
