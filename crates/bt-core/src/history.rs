//! Per-day history series for the trailing week.
//!
//! Every series has exactly one entry per calendar day, most recent day
//! first, whether or not anything happened that day.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DayClock;
use crate::event::Event;
use crate::event_kind::{EventKind, Orientation};
use crate::stats::round_tenths;
use crate::store::{EventQuery, EventStore};

const HISTORY_KINDS: [EventKind; 6] = [
    EventKind::Feeding,
    EventKind::Pee,
    EventKind::Poop,
    EventKind::Mixed,
    EventKind::Sleep,
    EventKind::Growth,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingBreakdown {
    pub left: u32,
    pub right: u32,
    pub expressed: u32,
}

/// Feeds started on one day, including ones still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingDay {
    pub date: NaiveDate,
    pub count: u32,
    pub details: FeedingBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaperBreakdown {
    pub pee: u32,
    pub poop: u32,
    pub mixed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaperDay {
    pub date: NaiveDate,
    pub count: u32,
    pub details: DiaperBreakdown,
}

/// Completed sleep that started on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepDay {
    pub date: NaiveDate,
    /// Hours, rounded to one decimal.
    pub total_hours: f64,
}

/// The last growth reading of a day, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDay {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub feeding: Vec<FeedingDay>,
    pub diaper: Vec<DiaperDay>,
    pub sleep: Vec<SleepDay>,
    pub growth: Vec<GrowthDay>,
}

#[derive(Debug, Default)]
struct DayBucket<'a> {
    feeding: FeedingBreakdown,
    feeding_count: u32,
    diaper: DiaperBreakdown,
    sleep_seconds: i64,
    last_growth: Option<&'a Event>,
}

impl<'a> DayBucket<'a> {
    /// Events must arrive in ascending timestamp order.
    fn add(&mut self, event: &'a Event) {
        match event.kind {
            EventKind::Feeding => {
                self.feeding_count += 1;
                match event.orientation {
                    Some(Orientation::Left) => self.feeding.left += 1,
                    Some(Orientation::Right) => self.feeding.right += 1,
                    Some(Orientation::Expressed) => self.feeding.expressed += 1,
                    _ => {}
                }
            }
            EventKind::Pee => self.diaper.pee += 1,
            EventKind::Poop => self.diaper.poop += 1,
            EventKind::Mixed => self.diaper.mixed += 1,
            EventKind::Sleep => {
                if let Some(elapsed) = event.elapsed() {
                    self.sleep_seconds += elapsed.num_seconds().max(0);
                }
            }
            EventKind::Growth => self.last_growth = Some(event),
            EventKind::Other => {}
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "a week of sleep fits in f64")]
    fn sleep_hours(&self) -> f64 {
        round_tenths(self.sleep_seconds as f64 / 3600.0)
    }
}

/// The `days` calendar days ending today, most recent first.
pub fn trailing_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .collect()
}

/// Builds the feeding, diaper, sleep and growth series.
///
/// Each event lands on the local calendar day its start timestamp falls on.
/// Events after `now` are ignored.
pub fn build_history<S: EventStore>(
    store: &S,
    clock: &DayClock,
    now: DateTime<Utc>,
    days: u32,
) -> Result<History, S::Error> {
    let dates = trailing_days(clock.local_date(now), days);
    let Some(oldest) = dates.last() else {
        return Ok(History {
            feeding: Vec::new(),
            diaper: Vec::new(),
            sleep: Vec::new(),
            growth: Vec::new(),
        });
    };

    let events = store.query(
        &EventQuery::kinds(&HISTORY_KINDS)
            .since(clock.day_start(*oldest))
            .through(now),
    )?;

    let mut buckets: BTreeMap<NaiveDate, DayBucket<'_>> = BTreeMap::new();
    for event in &events {
        buckets
            .entry(clock.local_date(event.timestamp))
            .or_default()
            .add(event);
    }
    tracing::debug!(events = events.len(), days, "built history");

    let empty = DayBucket::default();
    let bucket = |date: NaiveDate| buckets.get(&date).unwrap_or(&empty);

    Ok(History {
        feeding: dates
            .iter()
            .map(|date| {
                let day = bucket(*date);
                FeedingDay {
                    date: *date,
                    count: day.feeding_count,
                    details: day.feeding,
                }
            })
            .collect(),
        diaper: dates
            .iter()
            .map(|date| {
                let day = bucket(*date);
                DiaperDay {
                    date: *date,
                    count: day.diaper.pee + day.diaper.poop + day.diaper.mixed,
                    details: day.diaper,
                }
            })
            .collect(),
        sleep: dates
            .iter()
            .map(|date| SleepDay {
                date: *date,
                total_hours: bucket(*date).sleep_hours(),
            })
            .collect(),
        growth: dates
            .iter()
            .map(|date| {
                let last = bucket(*date).last_growth;
                GrowthDay {
                    date: *date,
                    weight: last.and_then(|event| event.weight),
                    height: last.and_then(|event| event.height),
                }
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    use crate::store::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn clock() -> DayClock {
        DayClock::new(chrono_tz::UTC)
    }

    fn feed(id: i64, ts: DateTime<Utc>, side: Option<Orientation>) -> Event {
        let mut event = Event::new(id, EventKind::Feeding, ts);
        event.orientation = side;
        event
    }

    fn growth(id: i64, ts: DateTime<Utc>, weight: f64, height: Option<f64>) -> Event {
        let mut event = Event::new(id, EventKind::Growth, ts);
        event.weight = Some(weight);
        event.height = height;
        event
    }

    #[test]
    fn empty_log_still_yields_seven_entries() {
        let history = build_history(&MemoryStore::default(), &clock(), now(), 7).unwrap();
        assert_eq!(history.feeding.len(), 7);
        assert_eq!(history.diaper.len(), 7);
        assert_eq!(history.sleep.len(), 7);
        assert_eq!(history.growth.len(), 7);
        assert_eq!(history.feeding[0].date, date(15));
        assert_eq!(history.feeding[6].date, date(9));
        assert!(history.growth.iter().all(|day| day.weight.is_none()));
    }

    #[test]
    fn feeding_breakdown_counts_every_feed() {
        let mut ongoing = feed(3, at(15, 17), Some(Orientation::Left));
        ongoing.detail = Some(crate::duration::ONGOING.to_string());
        let store = MemoryStore::new(vec![
            feed(1, at(15, 8), Some(Orientation::Left)),
            feed(2, at(15, 12), Some(Orientation::Right)),
            ongoing,
            feed(4, at(15, 9), Some(Orientation::Mum)),
            feed(5, at(14, 9), Some(Orientation::Expressed)),
        ]);

        let history = build_history(&store, &clock(), now(), 7).unwrap();
        assert_eq!(history.feeding[0].count, 4);
        assert_eq!(
            history.feeding[0].details,
            FeedingBreakdown {
                left: 2,
                right: 1,
                expressed: 0,
            }
        );
        assert_eq!(history.feeding[1].count, 1);
        assert_eq!(history.feeding[1].details.expressed, 1);
    }

    #[test]
    fn diapers_break_down_by_kind() {
        let store = MemoryStore::new(vec![
            Event::new(1, EventKind::Pee, at(13, 8)),
            Event::new(2, EventKind::Poop, at(13, 9)),
            Event::new(3, EventKind::Mixed, at(13, 10)),
            Event::new(4, EventKind::Pee, at(13, 11)),
        ]);
        let history = build_history(&store, &clock(), now(), 7).unwrap();
        let day = &history.diaper[2];
        assert_eq!(day.date, date(13));
        assert_eq!(day.count, 4);
        assert_eq!(
            day.details,
            DiaperBreakdown {
                pee: 2,
                poop: 1,
                mixed: 1,
            }
        );
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "rounded to one decimal")]
    fn sleep_totals_completed_sessions_by_start_day() {
        let mut night = Event::new(1, EventKind::Sleep, at(14, 20));
        night.end_timestamp = Some(at(14, 20) + Duration::minutes(620));
        night.detail = Some("10:20:00".to_string());
        let mut nap = Event::new(2, EventKind::Sleep, at(14, 13));
        nap.end_timestamp = Some(at(14, 13) + Duration::minutes(45));
        let mut ongoing = Event::new(3, EventKind::Sleep, at(15, 17));
        ongoing.detail = Some(crate::duration::ONGOING.to_string());
        let store = MemoryStore::new(vec![night, nap, ongoing]);

        let history = build_history(&store, &clock(), now(), 7).unwrap();
        assert_eq!(history.sleep[0].total_hours, 0.0);
        assert_eq!(history.sleep[1].total_hours, 11.1);
    }

    #[test]
    fn growth_takes_last_reading_of_the_day() {
        let store = MemoryStore::new(vec![
            growth(2, at(12, 18), 5.4, None),
            growth(1, at(12, 9), 5.2, Some(58.0)),
        ]);
        let history = build_history(&store, &clock(), now(), 7).unwrap();
        assert_eq!(
            history.growth[3],
            GrowthDay {
                date: date(12),
                weight: Some(5.4),
                height: None,
            }
        );
    }

    #[test]
    fn events_outside_the_week_or_after_now_are_ignored() {
        let store = MemoryStore::new(vec![
            Event::new(1, EventKind::Pee, at(8, 23)),
            Event::new(2, EventKind::Pee, at(15, 19)),
            Event::new(3, EventKind::Other, at(15, 9)),
        ]);
        let history = build_history(&store, &clock(), now(), 7).unwrap();
        assert!(history.diaper.iter().all(|day| day.count == 0));
    }

    #[test]
    fn days_follow_the_configured_timezone() {
        let clock = DayClock::new(chrono_tz::America::Los_Angeles);
        // 02:00 UTC on the 15th is the evening of the 14th in Los Angeles.
        let store = MemoryStore::new(vec![Event::new(1, EventKind::Poop, at(15, 2))]);
        let history = build_history(&store, &clock, now(), 7).unwrap();
        assert_eq!(history.diaper[1].date, date(14));
        assert_eq!(history.diaper[1].details.poop, 1);
    }
}
