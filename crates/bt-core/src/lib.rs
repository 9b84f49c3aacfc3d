//! Core domain logic for the baby tracker.
//!
//! This crate contains the event model and the read-time engine that
//! derives everything the dashboard shows:
//! - Stats: today-versus-yesterday feeding and diaper metrics
//! - History: per-day series for the trailing week
//! - Prediction: clustering recent sleep into daily windows, with
//!   age-based norms as the fallback, projected over the next two weeks
//!
//! The engine only reads through the [`EventStore`] trait and never
//! mutates anything.

pub mod clock;
pub mod cluster;
pub mod config;
pub mod dashboard;
pub mod duration;
mod event;
mod event_kind;
pub mod history;
pub mod norms;
pub mod predict;
mod span;
pub mod stats;
pub mod store;
mod types;
mod window;

pub use clock::DayClock;
pub use config::{EngineConfig, SleepHeuristics};
pub use dashboard::{Dashboard, Predictions, assemble_dashboard};
pub use event::Event;
pub use event_kind::{DIAPER_KINDS, EventKind, Orientation, SESSION_KINDS};
pub use norms::{DevelopmentalStage, StageTable, age_in_months};
pub use span::{MINUTES_PER_DAY, MinuteSpan};
pub use store::{DetailFilter, EventQuery, EventStore, MemoryStore, SortOrder};
pub use types::{ClockTime, ValidationError};
pub use window::{ClockRange, SleepKind, Window};
