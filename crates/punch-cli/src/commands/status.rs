//! Status command for today's ledger, predictions, and alerts.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use punch_core::{DayLedger, DayStatus, LedgerAlert, ShiftOutlook, WorkerId, check_alerts};
use punch_store::Database;
use serde::Serialize;

use super::util::{format_clock, format_hms};

/// Today's status as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct StatusView {
    worker: String,
    date: NaiveDate,
    status: DayStatus,
    entry: Option<NaiveTime>,
    exit: Option<NaiveTime>,
    pause_seconds: i64,
    worked_seconds: i64,
    outlook: Option<ShiftOutlook>,
    alerts: Vec<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    worker: &WorkerId,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let date = now.date_naive();
    let events = db.fetch_events(worker, date, date)?;
    let ledger = DayLedger::compute(worker.clone(), date, events, now);

    let schedule = db.get_schedule(worker)?;
    let outlook = ShiftOutlook::project(&ledger, &schedule, now).with_context(|| {
        format!("schedule for {worker} is inconsistent; fix it with 'punch schedule set'")
    })?;
    let alerts = check_alerts(&ledger, now);

    if json {
        let view = StatusView {
            worker: worker.to_string(),
            date,
            status: ledger.status,
            entry: ledger.entry.as_ref().map(|e| e.timestamp.time()),
            exit: ledger.exit.as_ref().map(|e| e.timestamp.time()),
            pause_seconds: ledger.paused_seconds_at(now),
            worked_seconds: ledger.worked_seconds,
            outlook,
            alerts: alerts.iter().map(alert_line).collect(),
        };
        serde_json::to_writer_pretty(&mut *writer, &view)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Status for {worker} on {date}: {}", ledger.status)?;
    writeln!(
        writer,
        "Entry:  {}",
        format_clock(ledger.entry.as_ref().map(|e| e.timestamp.time()))
    )?;
    writeln!(
        writer,
        "Exit:   {}",
        format_clock(ledger.exit.as_ref().map(|e| e.timestamp.time()))
    )?;
    writeln!(writer, "Pause:  {}", format_hms(ledger.paused_seconds_at(now)))?;
    writeln!(writer, "Worked: {}", format_hms(ledger.worked_seconds))?;

    if let Some(outlook) = outlook {
        writeln!(writer)?;
        if outlook.shift_complete {
            writeln!(writer, "Scheduled net day already met.")?;
        } else {
            writeln!(
                writer,
                "Remaining work: {}",
                format_hms(outlook.remaining_work_seconds)
            )?;
        }
        if let Some(pause_end) = outlook.predicted_pause_end {
            writeln!(
                writer,
                "Predicted end of break: {}",
                pause_end.format("%H:%M:%S")
            )?;
        }
        writeln!(
            writer,
            "Predicted exit: {}",
            outlook.predicted_exit.format("%H:%M:%S")
        )?;
    }

    for alert in &alerts {
        writeln!(writer, "alert: {}", alert_line(alert))?;
    }

    Ok(())
}

fn alert_line(alert: &LedgerAlert) -> String {
    match alert {
        LedgerAlert::LongPause { seconds } => {
            format!("break open for {}", format_hms(*seconds))
        }
        LedgerAlert::NoPauseRegistered { worked_seconds } => {
            format!("{} worked without a break", format_hms(*worked_seconds))
        }
    }
}
