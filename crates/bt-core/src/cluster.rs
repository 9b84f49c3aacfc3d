//! Sleep window clustering.
//!
//! Groups recent completed sleeps into representative daily windows.
//!
//! # Algorithm
//!
//! 1. Turn every completed sleep into a [`MinuteSpan`] of local clock minutes.
//! 2. Sort spans by start minute.
//! 3. Walk the sorted spans once. A span joins the open cluster while its
//!    start is less than `cluster_gap_minutes` after the start of the
//!    cluster's *first* member; otherwise the cluster closes and a new one
//!    opens.
//! 4. Clusters with at least `min_cluster_size` members become windows whose
//!    start and end are the truncated mean of the members' minutes.
//!
//! This is a tie-break policy rather than a statistical model. Outliers are
//! not rejected; only clusters that are too small are dropped.

use serde::{Deserialize, Serialize};

use crate::clock::DayClock;
use crate::config::SleepHeuristics;
use crate::event::Event;
use crate::event_kind::EventKind;
use crate::span::MinuteSpan;
use crate::types::ClockTime;
use crate::window::{ClockRange, Window};

/// A completed sleep projected onto local clock minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepInterval {
    pub event_id: i64,
    pub start_minute: u32,
    /// End minute, lifted past 1440 when the sleep crosses midnight.
    pub end_minute: u32,
}

impl SleepInterval {
    pub const fn span(self) -> MinuteSpan {
        MinuteSpan::wrapping(self.start_minute, self.end_minute)
    }
}

/// Completed sleeps as clock-minute intervals.
///
/// Ongoing sleeps, sleeps without an `end_timestamp` and non-sleep events
/// are skipped.
pub fn sleep_intervals(events: &[Event], clock: &DayClock) -> Vec<SleepInterval> {
    events
        .iter()
        .filter(|event| event.kind == EventKind::Sleep && !event.is_ongoing())
        .filter_map(|event| {
            let end = event.end_timestamp?;
            let span = MinuteSpan::between(clock.clock_time(event.timestamp), clock.clock_time(end));
            Some(SleepInterval {
                event_id: event.id,
                start_minute: span.start(),
                end_minute: span.end(),
            })
        })
        .collect()
}

/// Clusters intervals by start minute into representative windows.
///
/// Returned windows are ordered by start minute.
pub fn cluster_sleep_windows(
    intervals: &[SleepInterval],
    heuristics: &SleepHeuristics,
) -> Vec<Window> {
    let mut sorted: Vec<MinuteSpan> = intervals.iter().map(|interval| interval.span()).collect();
    sorted.sort_by_key(|span| span.start());

    let mut clusters: Vec<Vec<MinuteSpan>> = Vec::new();
    for span in sorted {
        match clusters.last_mut() {
            Some(cluster)
                if cluster
                    .first()
                    .is_some_and(|first| span.start() - first.start() < heuristics.cluster_gap_minutes) =>
            {
                cluster.push(span);
            }
            _ => clusters.push(vec![span]),
        }
    }

    let windows: Vec<Window> = clusters
        .iter()
        .filter(|cluster| cluster.len() >= heuristics.min_cluster_size)
        .map(|cluster| mean_window(cluster, heuristics.night_threshold_minutes))
        .collect();

    tracing::debug!(
        intervals = intervals.len(),
        clusters = clusters.len(),
        windows = windows.len(),
        "clustered sleep history"
    );
    windows
}

fn mean_window(cluster: &[MinuteSpan], night_threshold_minutes: u32) -> Window {
    let members = i64::try_from(cluster.len()).unwrap_or(i64::MAX).max(1);
    let start: i64 = cluster.iter().map(|span| i64::from(span.start())).sum();
    let end: i64 = cluster.iter().map(|span| i64::from(span.end())).sum();
    let range = ClockRange::new(
        ClockTime::from_minutes_wrapping(start / members),
        ClockTime::from_minutes_wrapping(end / members),
    );
    Window::classify(range, night_threshold_minutes)
}
