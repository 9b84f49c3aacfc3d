//! Dashboard command: today's summary and the sleep forecast.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::predict::ScheduleSource;
use bt_core::stats::Metric;
use bt_core::{Dashboard, EngineConfig, Event, SleepKind, assemble_dashboard};
use bt_db::Database;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::util::local_time;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &EngineConfig,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dashboard = assemble_dashboard(db, config, now).context("failed to build dashboard")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&dashboard)?)?;
    } else {
        write_summary(writer, &dashboard, config.timezone)?;
    }
    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, dashboard: &Dashboard, tz: Tz) -> Result<()> {
    let feeding = &dashboard.feeding;
    writeln!(writer, "Feeds today: {}", count_line(&feeding.count))?;
    writeln!(
        writer,
        "Feeding minutes: {:.1} (yesterday {:.1}, {:+.1})",
        feeding.total_minutes.today, feeding.total_minutes.yesterday, feeding.total_minutes.delta
    )?;

    let diapers = &dashboard.diapers;
    writeln!(writer, "Diapers today: {}", count_line(&diapers.total))?;
    writeln!(
        writer,
        "  pee {}, poop {}, mixed {}",
        diapers.pee.today, diapers.poop.today, diapers.mixed.today
    )?;
    writeln!(
        writer,
        "Last change: {} (pee {}, poop {})",
        diapers.last_change, diapers.last_pee, diapers.last_poop
    )?;

    writeln!(writer, "Ongoing feed: {}", ongoing_line(dashboard.ongoing_feed.as_ref(), tz))?;
    writeln!(writer, "Ongoing sleep: {}", ongoing_line(dashboard.ongoing_sleep.as_ref(), tz))?;

    let summary = &dashboard.predictions.sleep.summary;
    let source = match summary.source {
        ScheduleSource::History => "history",
        ScheduleSource::Norms => "norms",
    };
    writeln!(
        writer,
        "Sleep schedule ({}, from {source}): {} naps, {:.1}h",
        summary.stage, summary.nap_count, summary.total_hours
    )?;
    for detail in &summary.details {
        let kind = match detail.kind {
            SleepKind::Nap => "Nap",
            SleepKind::Night => "Night",
        };
        writeln!(
            writer,
            "  {}-{} {kind} {:.1}h",
            detail.start, detail.end, detail.duration_hours
        )?;
    }
    Ok(())
}

fn count_line(metric: &Metric<i64>) -> String {
    format!(
        "{} (yesterday {}, {:+})",
        metric.today, metric.yesterday, metric.delta
    )
}

fn ongoing_line(event: Option<&Event>, tz: Tz) -> String {
    event.map_or_else(
        || "none".to_string(),
        |event| match event.orientation {
            Some(side) => format!("#{} ({side}) since {}", event.id, local_time(event.timestamp, tz)),
            None => format!("#{} since {}", event.id, local_time(event.timestamp, tz)),
        },
    )
}
