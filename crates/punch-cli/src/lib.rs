//! Punch clock CLI library.
//!
//! This crate provides the CLI interface for the punch clock.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ExportFormat, ScheduleAction};
pub use config::Config;
