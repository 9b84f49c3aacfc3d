//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::span::MINUTES_PER_DAY;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The event kind string is not one of the known kinds.
    #[error("unknown event kind: {value}")]
    UnknownEventKind { value: String },

    /// The orientation string is not one of the known orientations.
    #[error("unknown orientation: {value}")]
    UnknownOrientation { value: String },

    /// The clock time is not a valid `HH:MM` value.
    #[error("invalid clock time {value:?}, expected HH:MM")]
    InvalidClockTime { value: String },
}

/// A wall-clock time of day with minute precision.
///
/// Serialized as the zero-padded `"HH:MM"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a clock time from hours and minutes.
    pub fn new(hour: u16, minute: u16) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidClockTime {
                value: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Creates a clock time from any minute count, wrapping past midnight.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rem_euclid(1440) is always in 0..1440"
    )]
    pub const fn from_minutes_wrapping(minutes: i64) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY as i64) as u16)
    }

    /// Minutes since midnight, in `0..1440`.
    #[must_use]
    pub fn minute_of_day(self) -> u32 {
        u32::from(self.0)
    }

    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime {
            value: s.to_string(),
        };
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}
