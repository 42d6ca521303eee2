//! Punch registration commands (`punch in|pause|resume|out`).

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use punch_core::{DayLedger, DayStatus, PunchKind, WorkerId};
use punch_store::Database;

use super::util::format_hms;

/// Registers one punch at `now` and prints the resulting day status.
///
/// Any punch sequence is accepted. The ledger computation absorbs
/// out-of-order or repeated punches, so there is nothing to reject here;
/// a warning is printed when the punch looks out of place.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    worker: &WorkerId,
    kind: PunchKind,
    now: DateTime<Utc>,
) -> Result<()> {
    let date = now.date_naive();
    let before = DayLedger::compute(worker.clone(), date, db.fetch_events(worker, date, date)?, now);

    if let Some(warning) = sequence_warning(&before, kind) {
        writeln!(writer, "warning: {warning}")?;
    }

    db.append_event(worker, kind, now, None)?;

    let ledger =
        DayLedger::compute(worker.clone(), date, db.fetch_events(worker, date, date)?, now);
    writeln!(
        writer,
        "Registered {} for {} at {}",
        kind,
        worker,
        now.format("%H:%M:%S")
    )?;
    writeln!(
        writer,
        "Status: {}  Worked: {}",
        ledger.status,
        format_hms(ledger.worked_seconds)
    )?;

    Ok(())
}

/// A punch that does not follow from the current status. Informational only.
fn sequence_warning(ledger: &DayLedger, kind: PunchKind) -> Option<&'static str> {
    match (ledger.status, kind) {
        (DayStatus::Working | DayStatus::OnPause, PunchKind::Entry) => {
            Some("already clocked in today")
        }
        (DayStatus::Awaiting, PunchKind::PauseStart | PunchKind::PauseEnd | PunchKind::Exit) => {
            Some("no entry punch registered today")
        }
        (DayStatus::OnPause, PunchKind::PauseStart) => Some("a break is already open"),
        (DayStatus::Working, PunchKind::PauseEnd) => Some("no break is open"),
        (DayStatus::Finished, _) => Some("already clocked out today"),
        _ => None,
    }
}
