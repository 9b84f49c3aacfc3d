//! Today-versus-yesterday statistics for feeds and diapers.
//!
//! Today is `[local midnight, now)`; yesterday is the whole previous local
//! calendar day. Every metric reports both values and `today - yesterday`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DayClock;
use crate::duration::format_elapsed;
use crate::event::Event;
use crate::event_kind::{DIAPER_KINDS, EventKind};
use crate::store::{EventQuery, EventStore};

/// Text reported when no matching event exists.
pub const NEVER: &str = "Never";

/// A metric for today and yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric<T> {
    pub today: T,
    pub yesterday: T,
    pub delta: T,
}

impl Metric<i64> {
    pub const fn count(today: i64, yesterday: i64) -> Self {
        Self {
            today,
            yesterday,
            delta: today - yesterday,
        }
    }
}

impl Metric<f64> {
    /// Rounds each value to one decimal after computing the delta.
    pub fn minutes(today: f64, yesterday: f64) -> Self {
        Self {
            today: round_tenths(today),
            yesterday: round_tenths(yesterday),
            delta: round_tenths(today - yesterday),
        }
    }
}

/// Rounds to one decimal. Zero is always positive zero.
pub(crate) fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

/// Completed feeding sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStats {
    pub count: Metric<i64>,
    pub total_minutes: Metric<f64>,
    pub avg_minutes: Metric<f64>,
}

/// Diaper changes by kind, plus time since the last of each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperStats {
    pub pee: Metric<i64>,
    pub poop: Metric<i64>,
    pub mixed: Metric<i64>,
    pub total: Metric<i64>,
    /// Kind of the most recent diaper change.
    pub last_kind: Option<EventKind>,
    /// Time since the most recent diaper change of any kind.
    pub last_change: String,
    /// Time since the last wet diaper (pee or mixed).
    pub last_pee: String,
    /// Time since the last dirty diaper (poop or mixed).
    pub last_poop: String,
}

/// Half-open bounds of today-so-far and the whole of yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindows {
    pub today: (DateTime<Utc>, DateTime<Utc>),
    pub yesterday: (DateTime<Utc>, DateTime<Utc>),
}

impl DayWindows {
    pub fn at(clock: &DayClock, now: DateTime<Utc>) -> Self {
        let today = clock.local_date(now);
        let midnight = clock.day_start(today);
        let yesterday_start = today
            .pred_opt()
            .map_or(midnight - chrono::Duration::hours(24), |d| clock.day_start(d));
        Self {
            today: (midnight, now),
            yesterday: (yesterday_start, midnight),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct FeedTotals {
    count: i64,
    total_minutes: f64,
}

impl FeedTotals {
    #[allow(clippy::cast_precision_loss, reason = "daily feed counts are tiny")]
    fn average(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_minutes / self.count as f64
        }
    }
}

fn feed_totals<S: EventStore>(
    store: &S,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
) -> Result<FeedTotals, S::Error> {
    let feeds = store.query(
        &EventQuery::kind(EventKind::Feeding)
            .not_ongoing()
            .since(start)
            .before(end),
    )?;
    Ok(FeedTotals {
        count: count(&feeds),
        total_minutes: feeds
            .iter()
            .map(Event::detail_minutes)
            .fold(0.0, |acc, minutes| acc + minutes),
    })
}

/// Count, total and average duration of completed feeds.
///
/// Durations come from the `HH:MM:SS` detail text; malformed text counts
/// as zero minutes but the feed is still counted.
pub fn feed_stats<S: EventStore>(
    store: &S,
    clock: &DayClock,
    now: DateTime<Utc>,
) -> Result<FeedStats, S::Error> {
    let windows = DayWindows::at(clock, now);
    let today = feed_totals(store, windows.today)?;
    let yesterday = feed_totals(store, windows.yesterday)?;

    Ok(FeedStats {
        count: Metric::count(today.count, yesterday.count),
        total_minutes: Metric::minutes(today.total_minutes, yesterday.total_minutes),
        avg_minutes: Metric::minutes(today.average(), yesterday.average()),
    })
}

fn diaper_counts<S: EventStore>(
    store: &S,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
) -> Result<[i64; 3], S::Error> {
    let diapers = store.query(&EventQuery::kinds(&DIAPER_KINDS).since(start).before(end))?;
    let mut counts = [0; 3];
    for (slot, kind) in counts.iter_mut().zip(DIAPER_KINDS) {
        *slot = count(diapers.iter().filter(|event| event.kind == kind));
    }
    Ok(counts)
}

/// Per-kind diaper counts and "time since" strings.
pub fn diaper_stats<S: EventStore>(
    store: &S,
    clock: &DayClock,
    now: DateTime<Utc>,
) -> Result<DiaperStats, S::Error> {
    let windows = DayWindows::at(clock, now);
    let [pee_t, poop_t, mixed_t] = diaper_counts(store, windows.today)?;
    let [pee_y, poop_y, mixed_y] = diaper_counts(store, windows.yesterday)?;

    let last_diaper = store.latest(&EventQuery::kinds(&DIAPER_KINDS).through(now))?;

    Ok(DiaperStats {
        pee: Metric::count(pee_t, pee_y),
        poop: Metric::count(poop_t, poop_y),
        mixed: Metric::count(mixed_t, mixed_y),
        total: Metric::count(pee_t + poop_t + mixed_t, pee_y + poop_y + mixed_y),
        last_kind: last_diaper.as_ref().map(|event| event.kind),
        last_change: since_text(last_diaper.as_ref(), now),
        last_pee: last_occurrence(store, &[EventKind::Pee, EventKind::Mixed], now)?,
        last_poop: last_occurrence(store, &[EventKind::Poop, EventKind::Mixed], now)?,
    })
}

/// Time since the most recent event of `kinds` at or before `now`.
///
/// Returns [`NEVER`] when there is none.
pub fn last_occurrence<S: EventStore>(
    store: &S,
    kinds: &[EventKind],
    now: DateTime<Utc>,
) -> Result<String, S::Error> {
    let latest = store.latest(&EventQuery::kinds(kinds).through(now))?;
    Ok(since_text(latest.as_ref(), now))
}

fn since_text(event: Option<&Event>, now: DateTime<Utc>) -> String {
    event.map_or_else(
        || NEVER.to_string(),
        |event| format_elapsed(now - event.timestamp),
    )
}

fn count<'a>(events: impl IntoIterator<Item = &'a Event>) -> i64 {
    i64::try_from(events.into_iter().count()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    use crate::store::MemoryStore;

    fn clock() -> DayClock {
        DayClock::new(chrono_tz::UTC)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()
    }

    fn at(days_ago: i64, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, hour, minute, 0).unwrap() - Duration::days(days_ago)
    }

    fn feed(id: i64, timestamp: DateTime<Utc>, detail: &str) -> Event {
        let mut event = Event::new(id, EventKind::Feeding, timestamp);
        event.detail = Some(detail.to_string());
        event
    }

    #[test]
    fn count_delta_is_today_minus_yesterday() {
        let mut events = Vec::new();
        for (i, hour) in [1, 5, 9].into_iter().enumerate() {
            events.push(feed(i64::try_from(i).unwrap(), at(0, hour, 0), "00:10:00"));
        }
        for (i, hour) in [1, 4, 8, 12, 20].into_iter().enumerate() {
            events.push(feed(10 + i64::try_from(i).unwrap(), at(1, hour, 0), "00:20:00"));
        }
        let store = MemoryStore::new(events);

        let stats = feed_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.count, Metric::count(3, 5));
        assert_eq!(stats.count.delta, -2);
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "rounded to one decimal")]
    fn durations_sum_and_average_with_rounding() {
        let store = MemoryStore::new(vec![
            feed(1, at(0, 8, 0), "00:15:20"),
            feed(2, at(0, 11, 0), "00:10:00"),
            feed(3, at(0, 13, 0), "garbage"),
            feed(4, at(1, 9, 0), "01:00:00"),
        ]);

        let stats = feed_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.count.today, 3);
        assert_eq!(stats.total_minutes.today, 25.3);
        assert_eq!(stats.avg_minutes.today, 8.4);
        assert_eq!(stats.total_minutes.yesterday, 60.0);
        assert_eq!(stats.total_minutes.delta, -34.7);
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "zero is exact")]
    fn ongoing_and_future_feeds_are_excluded() {
        let store = MemoryStore::new(vec![
            feed(1, at(0, 14, 30), "ongoing"),
            feed(2, now(), "00:10:00"),
            feed(3, at(0, 16, 0), "00:10:00"),
        ]);

        let stats = feed_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.count.today, 0);
        assert_eq!(stats.avg_minutes.today, 0.0);
    }

    #[test]
    fn empty_windows_report_positive_zero() {
        let stats = feed_stats(&MemoryStore::default(), &clock(), now()).unwrap();
        assert!(stats.total_minutes.today.is_sign_positive());
        assert!(stats.total_minutes.yesterday.is_sign_positive());
        assert!(stats.avg_minutes.today.is_sign_positive());

        let json = serde_json::to_string(&stats.total_minutes).unwrap();
        assert_eq!(json, r#"{"today":0.0,"yesterday":0.0,"delta":0.0}"#);
    }

    #[test]
    fn rounding_to_zero_drops_the_sign() {
        assert!(round_tenths(-0.0).is_sign_positive());
        assert!(round_tenths(-0.04).is_sign_positive());
    }

    #[test]
    fn diaper_counts_per_kind_and_total() {
        let store = MemoryStore::new(vec![
            Event::new(1, EventKind::Pee, at(0, 7, 0)),
            Event::new(2, EventKind::Pee, at(0, 9, 0)),
            Event::new(3, EventKind::Mixed, at(0, 10, 0)),
            Event::new(4, EventKind::Poop, at(1, 10, 0)),
            Event::new(5, EventKind::Feeding, at(0, 11, 0)),
        ]);

        let stats = diaper_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.pee, Metric::count(2, 0));
        assert_eq!(stats.poop, Metric::count(0, 1));
        assert_eq!(stats.mixed, Metric::count(1, 0));
        assert_eq!(stats.total, Metric::count(3, 1));
        assert_eq!(stats.last_kind, Some(EventKind::Mixed));
        assert_eq!(stats.last_change, "5h 0m");
    }

    #[test]
    fn mixed_counts_as_evidence_of_both() {
        let store = MemoryStore::new(vec![
            Event::new(1, EventKind::Pee, at(0, 9, 0)),
            Event::new(2, EventKind::Mixed, at(0, 14, 35)),
            Event::new(3, EventKind::Poop, at(0, 12, 0)),
        ]);

        let stats = diaper_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.last_pee, "25m");
        assert_eq!(stats.last_poop, "25m");
    }

    #[test]
    fn empty_log_reports_never() {
        let store = MemoryStore::default();
        let stats = diaper_stats(&store, &clock(), now()).unwrap();
        assert_eq!(stats.total, Metric::count(0, 0));
        assert_eq!(stats.last_kind, None);
        assert_eq!(stats.last_change, NEVER);
        assert_eq!(stats.last_pee, NEVER);
        assert_eq!(stats.last_poop, NEVER);
    }

    #[test]
    fn future_diapers_are_not_last_occurrences() {
        let store = MemoryStore::new(vec![Event::new(1, EventKind::Pee, at(0, 18, 0))]);
        let last = last_occurrence(&store, &[EventKind::Pee], now()).unwrap();
        assert_eq!(last, NEVER);
    }

    #[test]
    fn yesterday_window_follows_local_calendar() {
        let clock = DayClock::new(chrono_tz::Europe::London);
        // Day after the spring-forward change: yesterday was 23 hours long.
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let windows = DayWindows::at(&clock, now);
        let (start, end) = windows.yesterday;
        assert_eq!((end - start).num_hours(), 23);
        assert_eq!(windows.today.1, now);
    }
}
