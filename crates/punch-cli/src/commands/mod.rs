//! CLI subcommand implementations.

pub mod export;
pub mod punch;
pub mod report;
pub mod schedule;
pub mod status;
pub mod util;
