//! Logs command for listing recorded events.

use std::io::Write;

use anyhow::Result;
use bt_core::EventKind;
use bt_db::Database;
use chrono_tz::Tz;

use super::util::describe;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    kind: Option<EventKind>,
    skip: usize,
    limit: usize,
    json: bool,
    tz: Tz,
) -> Result<()> {
    let events = db.list_events(kind, skip, limit)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }
    for event in &events {
        writeln!(writer, "{}", describe(event, tz))?;
    }
    Ok(())
}
