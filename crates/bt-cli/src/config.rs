//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use bt_core::{EngineConfig, SleepHeuristics, StageTable};
use chrono::NaiveDate;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// IANA timezone that defines calendar days.
    pub timezone: String,
    /// Required for the age-based sleep norms.
    pub date_of_birth: Option<NaiveDate>,
    /// Replaces the built-in developmental stage table.
    pub stages: Option<StageTable>,
    #[serde(default)]
    pub heuristics: SleepHeuristics,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("bt.db"),
            timezone: system_timezone(),
            date_of_birth: None,
            stages: None,
            heuristics: SleepHeuristics::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations, optionally merging a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BT_*)
        figment = figment.merge(Env::prefixed("BT_"));

        figment.extract()
    }

    /// The configured timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| anyhow!("unknown timezone {:?}: {err}", self.timezone))
    }

    /// Validates the settings the dashboard engine needs.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let timezone = self.tz()?;
        let date_of_birth = self
            .date_of_birth
            .context("date_of_birth is not configured (set it in config.toml or BT_DATE_OF_BIRTH)")?;

        let mut config = EngineConfig::new(timezone, date_of_birth);
        if let Some(stages) = &self.stages {
            config.stages = stages.clone();
        }
        config.heuristics = self.heuristics;
        Ok(config)
    }
}

fn system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Returns the platform-specific config directory for bt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}

/// Returns the platform-specific data directory for bt.
///
/// On Linux: `~/.local/share/bt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bt"))
}
