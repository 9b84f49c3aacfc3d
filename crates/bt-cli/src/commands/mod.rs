//! CLI subcommand implementations.

pub mod dashboard;
pub mod delete;
pub mod edit;
pub mod last;
pub mod log;
pub mod logs;
pub mod session;
pub mod util;
