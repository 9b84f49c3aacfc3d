//! Start and stop commands for feeding and sleep sessions.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::Orientation;
use bt_db::Database;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::util::local_time;
use crate::cli::Session;

pub fn start_feeding<W: Write>(
    writer: &mut W,
    db: &mut Database,
    side: Orientation,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    let feed = db.start_feed(side, now).context("failed to start feed")?;
    writeln!(
        writer,
        "Started feed #{} ({side}) at {}",
        feed.feed_id.unwrap_or_default(),
        local_time(feed.timestamp, tz)
    )?;
    Ok(())
}

pub fn start_sleep<W: Write>(
    writer: &mut W,
    db: &mut Database,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    let sleep = db.start_sleep(now).context("failed to start sleep")?;
    writeln!(writer, "Started sleep at {}", local_time(sleep.timestamp, tz))?;
    Ok(())
}

pub fn stop<W: Write>(
    writer: &mut W,
    db: &mut Database,
    session: Session,
    now: DateTime<Utc>,
) -> Result<()> {
    let kind = session.kind();
    let Some(stopped) = db
        .stop_ongoing_session(kind, now)
        .context("failed to stop session")?
    else {
        anyhow::bail!("no ongoing {} session", kind.as_str().to_lowercase());
    };

    writeln!(
        writer,
        "Stopped {} #{} after {}",
        kind.as_str().to_lowercase(),
        stopped.id,
        stopped.detail.as_deref().unwrap_or_default()
    )?;
    Ok(())
}
