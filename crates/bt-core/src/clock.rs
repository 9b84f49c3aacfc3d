//! Calendar arithmetic in the configured timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::types::ClockTime;

/// Maps instants to local calendar days and wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    tz: Tz,
}

impl DayClock {
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// The local calendar date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// The UTC instant at which a local date begins.
    ///
    /// Handles DST ambiguity by picking the earlier time. When midnight does
    /// not exist (spring-forward at midnight), the day starts at the first
    /// valid local time after it.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => {
                let after_gap = midnight + Duration::hours(1);
                self.tz.from_local_datetime(&after_gap).earliest().map_or_else(
                    || Utc.from_utc_datetime(&midnight),
                    |dt| dt.with_timezone(&Utc),
                )
            }
        }
    }

    /// Half-open `[start, end)` bounds of a local calendar day.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.succ_opt().unwrap_or(date);
        (self.day_start(date), self.day_start(next))
    }

    /// Local midnight of the day containing `instant`.
    pub fn midnight(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.day_start(self.local_date(instant))
    }

    /// Local wall-clock time of an instant, truncated to the minute.
    pub fn clock_time(&self, instant: DateTime<Utc>) -> ClockTime {
        let local = instant.with_timezone(&self.tz);
        ClockTime::from_minutes_wrapping(i64::from(local.hour() * 60 + local.minute()))
    }
}
