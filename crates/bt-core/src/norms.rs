//! Age-based sleep norms.
//!
//! A fixed lookup table keyed by the child's age in whole months. Used as
//! the schedule source when history does not show a stable pattern.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::ClockTime;
use crate::window::{ClockRange, Window};

/// One row of the developmental stage table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentalStage {
    /// Inclusive lower age bound in months.
    pub age_lower_months: i32,
    /// Exclusive upper age bound in months.
    pub age_upper_months: i32,
    pub label: String,
    /// Expected nightly plus nap sleep, in hours.
    pub expected_total_hours: f64,
    pub expected_naps: u32,
    /// Canonical windows, ordered by start time.
    pub canonical_windows: Vec<ClockRange>,
}

impl DevelopmentalStage {
    pub const fn contains(&self, age_months: i32) -> bool {
        self.age_lower_months <= age_months && age_months < self.age_upper_months
    }

    /// Canonical windows classified as naps or night sleep.
    pub fn windows(&self, night_threshold_minutes: u32) -> Vec<Window> {
        self.canonical_windows
            .iter()
            .map(|range| Window::classify(*range, night_threshold_minutes))
            .collect()
    }
}

/// Only reachable from an empty table, which `StageTable::new` never builds.
static EMPTY_STAGE: DevelopmentalStage = DevelopmentalStage {
    age_lower_months: i32::MIN,
    age_upper_months: i32::MAX,
    label: String::new(),
    expected_total_hours: 0.0,
    expected_naps: 0,
    canonical_windows: Vec::new(),
};

/// Stages ordered by age. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DevelopmentalStage>")]
pub struct StageTable(Vec<DevelopmentalStage>);

impl StageTable {
    /// Builds a table, sorting stages by their lower age bound.
    ///
    /// Returns `None` when `stages` is empty.
    pub fn new(mut stages: Vec<DevelopmentalStage>) -> Option<Self> {
        if stages.is_empty() {
            return None;
        }
        stages.sort_by_key(|stage| stage.age_lower_months);
        Some(Self(stages))
    }

    pub fn stages(&self) -> &[DevelopmentalStage] {
        &self.0
    }

    /// The stage covering `age_months`.
    ///
    /// Ages below the first stage use the first stage; ages past the last
    /// use the last.
    pub fn stage_for(&self, age_months: i32) -> &DevelopmentalStage {
        self.0
            .first()
            .filter(|first| age_months < first.age_lower_months)
            .or_else(|| self.0.iter().find(|stage| stage.contains(age_months)))
            .or_else(|| self.0.last())
            .unwrap_or(&EMPTY_STAGE)
    }
}

impl TryFrom<Vec<DevelopmentalStage>> for StageTable {
    type Error = &'static str;

    fn try_from(stages: Vec<DevelopmentalStage>) -> Result<Self, Self::Error> {
        Self::new(stages).ok_or("stage table must contain at least one stage")
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self(default_stages())
    }
}

const fn clock(hour: u16, minute: u16) -> ClockTime {
    ClockTime::from_minutes_wrapping((hour * 60 + minute) as i64)
}

const fn range(start: (u16, u16), end: (u16, u16)) -> ClockRange {
    ClockRange::new(clock(start.0, start.1), clock(end.0, end.1))
}

fn default_stages() -> Vec<DevelopmentalStage> {
    vec![
        DevelopmentalStage {
            age_lower_months: i32::MIN,
            age_upper_months: 3,
            label: "Newborn".to_string(),
            expected_total_hours: 14.0,
            expected_naps: 4,
            canonical_windows: vec![
                range((9, 0), (11, 0)),
                range((13, 0), (15, 0)),
                range((17, 0), (18, 30)),
                range((20, 0), (7, 0)),
            ],
        },
        DevelopmentalStage {
            age_lower_months: 3,
            age_upper_months: 6,
            label: "3-6 Months".to_string(),
            expected_total_hours: 13.0,
            expected_naps: 3,
            canonical_windows: vec![
                range((9, 30), (11, 0)),
                range((13, 30), (15, 30)),
                range((19, 30), (7, 0)),
            ],
        },
        DevelopmentalStage {
            age_lower_months: 6,
            age_upper_months: i32::MAX,
            label: "6-12 Months".to_string(),
            expected_total_hours: 12.0,
            expected_naps: 2,
            canonical_windows: vec![
                range((9, 30), (11, 0)),
                range((14, 0), (16, 0)),
                range((19, 0), (7, 0)),
            ],
        },
    ]
}

/// Age in whole calendar months on `today`.
///
/// One month is subtracted when the day of month has not yet reached the
/// birth day. Negative when `today` is before the date of birth.
#[allow(clippy::cast_possible_wrap, reason = "months and days are at most 31")]
pub fn age_in_months(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - date_of_birth.year();
    let months = today.month() as i32 - date_of_birth.month() as i32;
    let mut age = years * 12 + months;
    if today.day() < date_of_birth.day() {
        age -= 1;
    }
    age
}
