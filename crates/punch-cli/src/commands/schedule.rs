//! Schedule command for viewing and setting a worker's shift.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use punch_core::{PausePolicy, ShiftSchedule, WorkerId};
use punch_store::Database;

use super::util::{format_hms, parse_clock};

pub fn show<W: Write>(writer: &mut W, db: &Database, worker: &WorkerId) -> Result<()> {
    let schedule = db.get_schedule(worker)?;

    writeln!(writer, "Schedule for {worker}:")?;
    writeln!(writer, "  Entry: {}", schedule.entry_time.format("%H:%M"))?;
    writeln!(writer, "  Exit:  {}", schedule.exit_time.format("%H:%M"))?;
    match schedule.pause {
        PausePolicy::Window { start, end } => {
            writeln!(
                writer,
                "  Pause: {}-{} (fixed window)",
                start.format("%H:%M"),
                end.format("%H:%M")
            )?;
        }
        PausePolicy::Duration { seconds } => {
            writeln!(writer, "  Pause: {} minutes", seconds / 60)?;
        }
    }
    match schedule.net_daily_seconds() {
        Ok(net) => writeln!(writer, "  Net day: {}", format_hms(net))?,
        Err(e) => writeln!(writer, "  Net day: invalid ({e})")?,
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn set<W: Write>(
    writer: &mut W,
    db: &Database,
    worker: &WorkerId,
    entry: &str,
    exit: &str,
    pause_start: Option<&str>,
    pause_end: Option<&str>,
    pause_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> Result<()> {
    let entry_time = parse_clock(entry)?;
    let exit_time = parse_clock(exit)?;

    let pause = match (pause_start, pause_end, pause_minutes) {
        (Some(start), Some(end), None) => PausePolicy::Window {
            start: parse_clock(start)?,
            end: parse_clock(end)?,
        },
        (None, None, Some(minutes)) => {
            if minutes < 0 {
                bail!("pause minutes must not be negative: {minutes}");
            }
            PausePolicy::Duration {
                seconds: minutes * 60,
            }
        }
        // clap enforces the pairing; an unset pause keeps whatever was
        // configured before.
        _ => db.get_schedule(worker)?.pause,
    };

    let schedule = ShiftSchedule {
        entry_time,
        exit_time,
        pause,
    };
    let net = schedule
        .net_daily_seconds()
        .context("refusing to store an inconsistent schedule")?;

    db.set_schedule(worker, &schedule, now)?;
    tracing::info!(%worker, net_seconds = net, "schedule updated");

    writeln!(writer, "Schedule updated.")?;
    show(writer, db, worker)
}
