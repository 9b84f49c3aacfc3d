//! Command-line argument definitions.

use std::path::PathBuf;

use bt_core::{EventKind, Orientation};
use clap::{Parser, Subcommand, ValueEnum};

/// Baby care tracker.
///
/// Logs feeds, diapers, sleep and growth, and shows day-over-day statistics
/// with a sleep schedule forecast.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record an event.
    Log {
        /// Event kind (Feeding, Pee, Poop, Mixed, Sleep, Growth, Other).
        kind: EventKind,

        /// Who or which side (Left, Right, Expressed, Mum, Dad).
        #[arg(long)]
        by: Option<Orientation>,

        /// Free-text detail.
        #[arg(long)]
        detail: Option<String>,

        /// Weight in kilograms.
        #[arg(long)]
        weight: Option<f64>,

        /// Height in centimetres.
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        comment: Option<String>,

        /// When it happened (RFC 3339 or e.g. "20 minutes ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,

        /// When a finished session ended. Sets the detail to its length.
        #[arg(long)]
        end: Option<String>,
    },

    /// Correct fields of a recorded event.
    Edit {
        id: i64,

        #[arg(long)]
        kind: Option<EventKind>,

        #[arg(long)]
        by: Option<Orientation>,

        #[arg(long)]
        detail: Option<String>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        comment: Option<String>,

        /// New start time.
        #[arg(long)]
        at: Option<String>,

        /// New end time. Recomputes the session length unless --detail is given.
        #[arg(long)]
        end: Option<String>,
    },

    /// Start a feeding or sleep session.
    Start {
        #[command(subcommand)]
        session: StartSession,
    },

    /// Stop the ongoing feeding or sleep session.
    Stop { session: Session },

    /// List recorded events, newest first.
    Logs {
        #[arg(long)]
        kind: Option<EventKind>,

        /// Number of events to skip.
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Maximum number of events to show.
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete an event by ID.
    Delete { id: i64 },

    /// Show the last completed feed or the last diaper change.
    Last { what: LastKind },

    /// Show today's statistics, weekly history and the sleep forecast.
    Dashboard {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum StartSession {
    /// Start feeding, stopping any feed in progress.
    Feeding {
        /// Left, Right, Expressed, Mum or Dad.
        #[arg(long)]
        side: Orientation,
    },
    /// Start a sleep.
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Session {
    Feeding,
    Sleep,
}

impl Session {
    pub const fn kind(self) -> EventKind {
        match self {
            Self::Feeding => EventKind::Feeding,
            Self::Sleep => EventKind::Sleep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LastKind {
    Feed,
    Diaper,
}
