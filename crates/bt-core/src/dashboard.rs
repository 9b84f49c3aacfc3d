//! The dashboard: every derived view in one structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::event::Event;
use crate::event_kind::EventKind;
use crate::history::{History, build_history};
use crate::predict::{SleepPrediction, predict_sleep};
use crate::stats::{DiaperStats, FeedStats, diaper_stats, feed_stats};
use crate::store::{EventQuery, EventStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub sleep: SleepPrediction,
}

/// Everything the dashboard shows, computed from one snapshot of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub feeding: FeedStats,
    pub diapers: DiaperStats,
    /// Most recent feed still in progress.
    pub ongoing_feed: Option<Event>,
    /// Most recent sleep still in progress.
    pub ongoing_sleep: Option<Event>,
    pub last_completed_feed: Option<Event>,
    pub predictions: Predictions,
    pub history: History,
}

/// Builds the dashboard as of `now`.
///
/// Read-only and deterministic: the same log, `now` and config always yield
/// the same dashboard. Events timestamped after `now` are not considered.
/// Store failures are returned unchanged.
pub fn assemble_dashboard<S: EventStore>(
    store: &S,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Dashboard, S::Error> {
    let clock = config.clock();

    let feeding = feed_stats(store, &clock, now)?;
    let diapers = diaper_stats(store, &clock, now)?;
    let history = build_history(store, &clock, now, config.heuristics.history_days)?;
    let sleep = predict_sleep(store, config, now)?;

    let ongoing_feed = store.latest(&EventQuery::kind(EventKind::Feeding).ongoing().through(now))?;
    let ongoing_sleep = store.latest(&EventQuery::kind(EventKind::Sleep).ongoing().through(now))?;
    let last_completed_feed =
        store.latest(&EventQuery::kind(EventKind::Feeding).not_ongoing().through(now))?;

    tracing::debug!(
        %now,
        feeds_today = feeding.count.today,
        diapers_today = diapers.total.today,
        ongoing_feed = ongoing_feed.is_some(),
        ongoing_sleep = ongoing_sleep.is_some(),
        "assembled dashboard"
    );

    Ok(Dashboard {
        feeding,
        diapers,
        ongoing_feed,
        ongoing_sleep,
        last_completed_feed,
        predictions: Predictions { sleep },
        history,
    })
}
