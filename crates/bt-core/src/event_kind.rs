//! Event kind and orientation enums as the single source of truth for their strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ValidationError;

/// Kinds of care events recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Feeding,
    Pee,
    Poop,
    Mixed,
    Sleep,
    Growth,
    Other,
}

/// Diaper change kinds. A `Mixed` diaper counts as both pee and poop.
pub const DIAPER_KINDS: [EventKind; 3] = [EventKind::Pee, EventKind::Poop, EventKind::Mixed];

/// Kinds that are logged as a start and later stopped.
pub const SESSION_KINDS: [EventKind; 2] = [EventKind::Feeding, EventKind::Sleep];

impl EventKind {
    /// Canonical string, as stored in the log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feeding => "Feeding",
            Self::Pee => "Pee",
            Self::Poop => "Poop",
            Self::Mixed => "Mixed",
            Self::Sleep => "Sleep",
            Self::Growth => "Growth",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn is_diaper(self) -> bool {
        DIAPER_KINDS.contains(&self)
    }

    #[must_use]
    pub fn is_session(self) -> bool {
        SESSION_KINDS.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Feeding" | "feeding" | "feed" => Ok(Self::Feeding),
            "Pee" | "pee" => Ok(Self::Pee),
            "Poop" | "poop" => Ok(Self::Poop),
            "Mixed" | "mixed" => Ok(Self::Mixed),
            "Sleep" | "sleep" => Ok(Self::Sleep),
            "Growth" | "growth" => Ok(Self::Growth),
            "Other" | "other" => Ok(Self::Other),
            _ => Err(ValidationError::UnknownEventKind {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which side a feed was taken from, or who handled a diaper change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Orientation {
    Left,
    Right,
    Expressed,
    Mum,
    Dad,
}

impl Orientation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Expressed => "Expressed",
            Self::Mum => "Mum",
            Self::Dad => "Dad",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left" | "left" => Ok(Self::Left),
            "Right" | "right" => Ok(Self::Right),
            "Expressed" | "expressed" => Ok(Self::Expressed),
            "Mum" | "mum" => Ok(Self::Mum),
            "Dad" | "dad" => Ok(Self::Dad),
            _ => Err(ValidationError::UnknownOrientation {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Orientation> for &'static str {
    fn from(orientation: Orientation) -> Self {
        orientation.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_kinds() {
        let variants = [
            EventKind::Feeding,
            EventKind::Pee,
            EventKind::Poop,
            EventKind::Mixed,
            EventKind::Sleep,
            EventKind::Growth,
            EventKind::Other,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: EventKind = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn lowercase_aliases_parse() {
        assert_eq!("feed".parse::<EventKind>().unwrap(), EventKind::Feeding);
        assert_eq!("sleep".parse::<EventKind>().unwrap(), EventKind::Sleep);
        assert_eq!("dad".parse::<Orientation>().unwrap(), Orientation::Dad);
    }

    #[test]
    fn unknown_kind_errors() {
        let err = "Bath".parse::<EventKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event kind: Bath");
    }

    #[test]
    fn diaper_and_session_sets() {
        assert!(EventKind::Mixed.is_diaper());
        assert!(!EventKind::Feeding.is_diaper());
        assert!(EventKind::Sleep.is_session());
        assert!(!EventKind::Growth.is_session());
    }

    #[test]
    fn orientation_serde_uses_canonical_names() {
        let json = serde_json::to_string(&Orientation::Expressed).unwrap();
        assert_eq!(json, "\"Expressed\"");
        let parsed: Orientation = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Orientation::Left);
        assert!(serde_json::from_str::<Orientation>("\"Up\"").is_err());
    }
}
