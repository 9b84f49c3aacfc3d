//! Last command: the most recent completed feed or diaper change.

use std::io::Write;

use anyhow::Result;
use bt_core::duration::{format_elapsed, format_seconds};
use bt_core::{DIAPER_KINDS, EventKind, EventQuery, EventStore, Orientation};
use bt_db::Database;
use chrono::{DateTime, Utc};

use crate::cli::LastKind;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    what: LastKind,
    now: DateTime<Utc>,
) -> Result<()> {
    match what {
        LastKind::Feed => last_feed(writer, db, now),
        LastKind::Diaper => last_diaper(writer, db, now),
    }
}

fn last_feed<W: Write>(writer: &mut W, db: &Database, now: DateTime<Utc>) -> Result<()> {
    let query = EventQuery::kind(EventKind::Feeding).not_ongoing().through(now);
    let Some(feed) = db.latest(&query)? else {
        writeln!(writer, "No previous feed found.")?;
        return Ok(());
    };

    writeln!(writer, "Last feed:")?;
    writeln!(
        writer,
        "Orientation: {}",
        feed.orientation.map_or("-", Orientation::as_str)
    )?;
    writeln!(writer, "Duration: {}", feed.detail.as_deref().unwrap_or("-"))?;
    writeln!(
        writer,
        "Time since: {}",
        format_seconds((now - feed.timestamp).num_seconds())
    )?;
    match feed.feed_id {
        Some(feed_id) => writeln!(writer, "Feed ID: {feed_id}")?,
        None => writeln!(writer, "Feed ID: -")?,
    }
    Ok(())
}

fn last_diaper<W: Write>(writer: &mut W, db: &Database, now: DateTime<Utc>) -> Result<()> {
    let Some(diaper) = db.latest(&EventQuery::kinds(&DIAPER_KINDS).through(now))? else {
        writeln!(writer, "No previous diaper change found.")?;
        return Ok(());
    };

    writeln!(writer, "Last diaper:")?;
    writeln!(writer, "Type: {}", diaper.kind)?;
    writeln!(writer, "Time since: {}", format_elapsed(now - diaper.timestamp))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_db::NewEvent;
    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 20, 15, 0, 0).unwrap()
    }

    fn render(db: &Database, what: LastKind) -> String {
        let mut output = Vec::new();
        run(&mut output, db, what, now()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn last_feed_skips_ongoing() {
        let mut db = Database::open_in_memory().unwrap();
        db.start_feed(Orientation::Left, now() - Duration::minutes(95))
            .unwrap();
        db.stop_ongoing_session(EventKind::Feeding, now() - Duration::minutes(80))
            .unwrap();
        db.start_feed(Orientation::Right, now() - Duration::minutes(5))
            .unwrap();

        assert_snapshot!(render(&db, LastKind::Feed), @r"
        Last feed:
        Orientation: Left
        Duration: 00:15:00
        Time since: 01:35:00
        Feed ID: 1
        ");
    }

    #[test]
    fn last_diaper_reports_kind_and_elapsed() {
        let mut db = Database::open_in_memory().unwrap();
        let event = NewEvent {
            timestamp: Some(now() - Duration::minutes(130)),
            ..NewEvent::new(EventKind::Poop)
        };
        db.insert_event(event, now()).unwrap();

        assert_snapshot!(render(&db, LastKind::Diaper), @r"
        Last diaper:
        Type: Poop
        Time since: 2h 10m
        ");
    }

    #[test]
    fn nothing_recorded() {
        let db = Database::open_in_memory().unwrap();
        assert_snapshot!(render(&db, LastKind::Feed), @"No previous feed found.");
        assert_snapshot!(render(&db, LastKind::Diaper), @"No previous diaper change found.");
    }
}
