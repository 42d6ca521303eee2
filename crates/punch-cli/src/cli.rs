//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Employee punch clock.
///
/// Registers punch events (entry, pause, resume, exit), derives worked time
/// and shift predictions, and produces exportable period reports.
#[derive(Debug, Parser)]
#[command(name = "punch", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Worker to act as (overrides the configured default).
    #[arg(short, long, global = true)]
    pub worker: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Punch the start of the working day.
    In,

    /// Punch the start of a break.
    Pause,

    /// Punch the end of a break.
    Resume,

    /// Punch the end of the working day.
    Out,

    /// Show today's status, worked time, and shift predictions.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize worked time, punctuality, and overtime for a period.
    Report {
        /// Current ISO week (Monday start). This is the default.
        #[arg(long)]
        week: bool,

        /// Previous ISO week.
        #[arg(long, conflicts_with_all = ["week", "month"])]
        last_week: bool,

        /// Current calendar month.
        #[arg(long, conflicts_with = "week")]
        month: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export per-day report rows for a period.
    Export {
        /// Current calendar month instead of the current week.
        #[arg(long)]
        month: bool,

        /// Output format.
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Show or set the worker's shift schedule.
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

/// Export output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Schedule subcommands.
#[derive(Debug, Subcommand)]
pub enum ScheduleAction {
    /// Show the effective schedule.
    Show,

    /// Set the schedule. Clock times are `HH:MM` (exit may be "before" entry
    /// for shifts that cross midnight).
    Set {
        /// Nominal clock-in time.
        #[arg(long)]
        entry: String,

        /// Nominal clock-out time.
        #[arg(long)]
        exit: String,

        /// Fixed pause window start (requires --pause-end).
        #[arg(long, requires = "pause_end")]
        pause_start: Option<String>,

        /// Fixed pause window end.
        #[arg(long, requires = "pause_start")]
        pause_end: Option<String>,

        /// Mandated pause length in minutes, when no fixed window applies.
        #[arg(long, conflicts_with_all = ["pause_start", "pause_end"])]
        pause_minutes: Option<i64>,
    },
}
