//! Sleep schedule forecasting.
//!
//! Picks a set of daily windows, from the child's own clustered history
//! when it shows enough of a pattern and from age norms otherwise, and
//! repeats that set over the forecast horizon.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DayClock;
use crate::cluster::{cluster_sleep_windows, sleep_intervals};
use crate::config::EngineConfig;
use crate::event::Event;
use crate::event_kind::EventKind;
use crate::norms::age_in_months;
use crate::stats::round_tenths;
use crate::store::{EventQuery, EventStore};
use crate::types::ClockTime;
use crate::window::{SleepKind, Window};

/// Where the forecast windows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleSource {
    History,
    Norms,
}

/// One forecast window with its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDetail {
    pub start: ClockTime,
    pub end: ClockTime,
    /// Hours, rounded to one decimal.
    pub duration_hours: f64,
    pub kind: SleepKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Developmental stage label for the child's current age.
    pub stage: String,
    pub source: ScheduleSource,
    pub nap_count: u32,
    /// Total forecast sleep per day, rounded to one decimal.
    pub total_hours: f64,
    /// Windows ordered by start time.
    pub details: Vec<WindowDetail>,
}

/// A sleep on a calendar day, either recorded or forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepEntry {
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    pub is_predicted: bool,
    /// Recorded length in minutes. `None` for forecast entries.
    pub duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepPrediction {
    /// Completed sleeps from the lookback period, oldest first.
    pub past: Vec<SleepEntry>,
    /// Forecast windows for each day after today.
    pub future: Vec<SleepEntry>,
    pub summary: ScheduleSummary,
}

/// Forecasts the sleep schedule.
///
/// Looks back over completed sleeps since local midnight `history_days`
/// days ago. If clustering yields fewer than `min_history_windows` windows
/// the current stage's canonical windows are used instead.
pub fn predict_sleep<S: EventStore>(
    store: &S,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<SleepPrediction, S::Error> {
    let clock = config.clock();
    let heuristics = &config.heuristics;
    let today = clock.local_date(now);
    let lookback = today
        .checked_sub_days(Days::new(u64::from(heuristics.history_days)))
        .unwrap_or(today);

    let sleeps = store.query(
        &EventQuery::kind(EventKind::Sleep)
            .not_ongoing()
            .since(clock.day_start(lookback))
            .through(now),
    )?;

    let age_months = age_in_months(config.date_of_birth, today);
    let stage = config.stages.stage_for(age_months);

    let clustered = cluster_sleep_windows(&sleep_intervals(&sleeps, &clock), heuristics);
    let (mut windows, source) = if clustered.len() >= heuristics.min_history_windows {
        (clustered, ScheduleSource::History)
    } else {
        (
            stage.windows(heuristics.night_threshold_minutes),
            ScheduleSource::Norms,
        )
    };
    windows.sort_by_key(|window| window.start);

    tracing::debug!(
        age_months,
        stage = %stage.label,
        source = ?source,
        windows = windows.len(),
        "selected sleep schedule"
    );

    let past = sleeps
        .iter()
        .filter_map(|event| past_entry(event, &clock))
        .collect();
    let future = (1..=heuristics.forecast_days)
        .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))))
        .flat_map(|date| {
            windows.iter().map(move |window| SleepEntry {
                date,
                start: window.start,
                end: window.end,
                is_predicted: true,
                duration_minutes: None,
            })
        })
        .collect();

    Ok(SleepPrediction {
        past,
        future,
        summary: summarize(stage.label.clone(), source, &windows),
    })
}

fn past_entry(event: &Event, clock: &DayClock) -> Option<SleepEntry> {
    let end = event.end_timestamp?;
    let elapsed = event.elapsed()?;
    #[allow(clippy::cast_precision_loss, reason = "sleep lengths are small")]
    let minutes = elapsed.num_seconds() as f64 / 60.0;
    Some(SleepEntry {
        date: clock.local_date(event.timestamp),
        start: clock.clock_time(event.timestamp),
        end: clock.clock_time(end),
        is_predicted: false,
        duration_minutes: Some(minutes),
    })
}

fn summarize(stage: String, source: ScheduleSource, windows: &[Window]) -> ScheduleSummary {
    let mut total_minutes = 0;
    let mut nap_count = 0;
    let mut details = Vec::with_capacity(windows.len());
    for window in windows {
        let minutes = window.duration_minutes();
        total_minutes += minutes;
        if window.kind == SleepKind::Nap {
            nap_count += 1;
        }
        details.push(WindowDetail {
            start: window.start,
            end: window.end,
            duration_hours: round_tenths(f64::from(minutes) / 60.0),
            kind: window.kind,
        });
    }

    ScheduleSummary {
        stage,
        source,
        nap_count,
        total_hours: round_tenths(f64::from(total_minutes) / 60.0),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use chrono_tz::Tz;

    use crate::store::MemoryStore;

    fn config(date_of_birth: NaiveDate) -> EngineConfig {
        EngineConfig::new(Tz::UTC, date_of_birth)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 16, 0, 0).unwrap()
    }

    fn dob(months_before: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .checked_sub_months(chrono::Months::new(months_before))
            .unwrap()
    }

    fn sleep(id: i64, start: DateTime<Utc>, minutes: i64) -> Event {
        let mut event = Event::new(id, EventKind::Sleep, start);
        event.end_timestamp = Some(start + Duration::minutes(minutes));
        event.detail = Some(crate::duration::format_seconds(minutes * 60));
        event
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, minute, 0).unwrap()
    }

    fn render(summary: &ScheduleSummary) -> Vec<String> {
        summary
            .details
            .iter()
            .map(|d| format!("{}-{} {:?} {}h", d.start, d.end, d.kind, d.duration_hours))
            .collect()
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "rounded to one decimal")]
    fn sparse_history_falls_back_to_newborn_norms() {
        let store = MemoryStore::new(vec![sleep(1, at(19, 13, 0), 90)]);
        let prediction = predict_sleep(&store, &config(dob(2)), now()).unwrap();

        let summary = &prediction.summary;
        assert_eq!(summary.source, ScheduleSource::Norms);
        assert_eq!(summary.stage, "Newborn");
        assert_eq!(
            render(summary),
            vec![
                "09:00-11:00 Nap 2h",
                "13:00-15:00 Nap 2h",
                "17:00-18:30 Nap 1.5h",
                "20:00-07:00 Night 11h",
            ]
        );
        assert_eq!(summary.nap_count, 3);
        assert_eq!(summary.total_hours, 16.5);
    }

    #[test]
    fn empty_log_uses_stage_for_age() {
        let prediction = predict_sleep(&MemoryStore::default(), &config(dob(7)), now()).unwrap();
        assert_eq!(prediction.summary.stage, "6-12 Months");
        assert_eq!(prediction.summary.details.len(), 3);
        assert!(prediction.past.is_empty());
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "rounded to one decimal")]
    fn stable_history_replaces_norms() {
        let store = MemoryStore::new(vec![
            sleep(1, at(17, 20, 0), 600),
            sleep(2, at(18, 20, 30), 600),
            sleep(3, at(18, 13, 0), 60),
            sleep(4, at(19, 13, 30), 90),
        ]);
        let prediction = predict_sleep(&store, &config(dob(4)), now()).unwrap();

        let summary = &prediction.summary;
        assert_eq!(summary.source, ScheduleSource::History);
        assert_eq!(summary.stage, "3-6 Months");
        assert_eq!(
            render(summary),
            vec!["13:15-14:30 Nap 1.3h", "20:15-06:15 Night 10h"]
        );
        assert_eq!(summary.nap_count, 1);
        assert_eq!(summary.total_hours, 11.3);
    }

    #[test]
    fn forecast_repeats_windows_for_fourteen_days() {
        let prediction = predict_sleep(&MemoryStore::default(), &config(dob(4)), now()).unwrap();
        assert_eq!(prediction.future.len(), 14 * 3);
        assert!(prediction.future.iter().all(|entry| entry.is_predicted));
        assert!(prediction.future.iter().all(|entry| entry.duration_minutes.is_none()));
        assert_eq!(
            prediction.future.first().map(|entry| entry.date),
            NaiveDate::from_ymd_opt(2025, 5, 21)
        );
        assert_eq!(
            prediction.future.last().map(|entry| entry.date),
            NaiveDate::from_ymd_opt(2025, 6, 3)
        );
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, reason = "whole minutes")]
    fn past_lists_completed_sleeps_in_lookback() {
        let mut ongoing = Event::new(5, EventKind::Sleep, at(20, 15, 0));
        ongoing.detail = Some(crate::duration::ONGOING.to_string());
        let mut no_end = sleep(6, at(19, 9, 0), 30);
        no_end.end_timestamp = None;
        let store = MemoryStore::new(vec![
            sleep(1, at(12, 9, 0), 60),
            sleep(2, at(13, 9, 0), 45),
            sleep(3, at(19, 22, 0), 480),
            ongoing,
            no_end,
        ]);
        let prediction = predict_sleep(&store, &config(dob(4)), now()).unwrap();

        let past: Vec<(i64, String, String)> = prediction
            .past
            .iter()
            .map(|entry| {
                (
                    entry.duration_minutes.map_or(0, |m| m as i64),
                    entry.start.to_string(),
                    entry.end.to_string(),
                )
            })
            .collect();
        assert_eq!(
            past,
            vec![
                (45, "09:00".to_string(), "09:45".to_string()),
                (480, "22:00".to_string(), "06:00".to_string()),
            ]
        );
        assert!(prediction.past.iter().all(|entry| !entry.is_predicted));
    }
}
