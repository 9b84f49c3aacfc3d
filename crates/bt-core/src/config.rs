//! Engine configuration.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::DayClock;
use crate::norms::StageTable;

/// Start minutes closer than this to a cluster's first member join the cluster.
pub const CLUSTER_GAP_MINUTES: u32 = 120;

/// Windows at least this long are night sleep; shorter ones are naps.
pub const NIGHT_THRESHOLD_MINUTES: u32 = 300;

/// Clusters with fewer members are treated as noise.
pub const MIN_CLUSTER_SIZE: usize = 2;

/// Fewer qualifying history windows than this falls back to age norms.
pub const MIN_HISTORY_WINDOWS: usize = 2;

/// Days of history shown per series, including today.
pub const HISTORY_DAYS: u32 = 7;

/// Days projected forward by the schedule forecast.
pub const FORECAST_DAYS: u32 = 14;

/// Tunables for sleep clustering and forecasting.
///
/// These values have not been validated empirically; they are kept as
/// configuration so deployments can adjust them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepHeuristics {
    pub cluster_gap_minutes: u32,
    pub night_threshold_minutes: u32,
    pub min_cluster_size: usize,
    pub min_history_windows: usize,
    pub history_days: u32,
    pub forecast_days: u32,
}

impl Default for SleepHeuristics {
    fn default() -> Self {
        Self {
            cluster_gap_minutes: CLUSTER_GAP_MINUTES,
            night_threshold_minutes: NIGHT_THRESHOLD_MINUTES,
            min_cluster_size: MIN_CLUSTER_SIZE,
            min_history_windows: MIN_HISTORY_WINDOWS,
            history_days: HISTORY_DAYS,
            forecast_days: FORECAST_DAYS,
        }
    }
}

/// Inputs the engine needs besides the event log and the current instant.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Timezone that defines calendar days and wall-clock times.
    pub timezone: Tz,
    pub date_of_birth: NaiveDate,
    pub stages: StageTable,
    pub heuristics: SleepHeuristics,
}

impl EngineConfig {
    /// Creates a configuration with the default stage table and heuristics.
    pub fn new(timezone: Tz, date_of_birth: NaiveDate) -> Self {
        Self {
            timezone,
            date_of_birth,
            stages: StageTable::default(),
            heuristics: SleepHeuristics::default(),
        }
    }

    pub const fn clock(&self) -> DayClock {
        DayClock::new(self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_heuristics_match_named_constants() {
        let heuristics = SleepHeuristics::default();
        assert_eq!(heuristics.cluster_gap_minutes, 120);
        assert_eq!(heuristics.night_threshold_minutes, 300);
        assert_eq!(heuristics.min_cluster_size, 2);
        assert_eq!(heuristics.min_history_windows, 2);
        assert_eq!(heuristics.history_days, 7);
        assert_eq!(heuristics.forecast_days, 14);
    }

    #[test]
    fn partial_heuristics_fill_defaults() {
        let heuristics: SleepHeuristics =
            serde_json::from_str(r#"{"cluster_gap_minutes": 90}"#).unwrap();
        assert_eq!(heuristics.cluster_gap_minutes, 90);
        assert_eq!(heuristics.night_threshold_minutes, NIGHT_THRESHOLD_MINUTES);
    }
}
