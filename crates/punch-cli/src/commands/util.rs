//! Shared utilities for CLI commands.

use anyhow::Context;
use chrono::NaiveTime;

/// Formats a second count as `HH:MM:SS`. Hours are not wrapped at 24, so
/// period totals like `42:30:00` render naturally. Negative inputs clamp
/// to `00:00:00`.
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Renders an optional time of day, with `-` for a punch that never happened.
pub fn format_clock(time: Option<NaiveTime>) -> String {
    time.map_or_else(|| "-".to_string(), |t| t.format("%H:%M:%S").to_string())
}

/// Parses a clock time argument as `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid clock time: {s}. Use HH:MM (e.g., 08:30)"))
}
