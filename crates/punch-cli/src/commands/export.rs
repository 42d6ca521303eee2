//! Export command producing machine-readable per-day rows.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use punch_core::{AggregateOptions, ReportRow, WorkerId, aggregate_period, report_rows};
use punch_store::Database;
use serde::Serialize;

use crate::ExportFormat;

use super::report::{Period, period_range};
use super::util::format_clock;

/// The JSON export envelope.
#[derive(Debug, Serialize)]
struct ExportView {
    worker: String,
    start: NaiveDate,
    end: NaiveDate,
    rows: Vec<ReportRow>,
    total_pause_seconds: i64,
    total_worked_seconds: i64,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    worker: &WorkerId,
    period: Period,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<()> {
    let (start, end) = period_range(period, now.date_naive());
    let events = db.fetch_events(worker, start, end)?;
    let schedule = db.get_schedule(worker)?;

    let aggregate =
        aggregate_period(worker, &schedule, events, now, &AggregateOptions::default())
            .with_context(|| {
                format!("schedule for {worker} is inconsistent; fix it with 'punch schedule set'")
            })?;
    let rows = report_rows(&aggregate.days, now);
    let total_pause_seconds: i64 = rows.iter().map(|r| r.pause_seconds).sum();
    let total_worked_seconds: i64 = rows.iter().map(|r| r.worked_seconds).sum();

    match format {
        ExportFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            csv.write_record([
                "worker",
                "date",
                "entry",
                "exit",
                "pause_seconds",
                "worked_seconds",
            ])?;
            for row in &rows {
                csv.write_record([
                    worker.as_str().to_string(),
                    row.date.to_string(),
                    format_clock(row.entry),
                    format_clock(row.exit),
                    row.pause_seconds.to_string(),
                    row.worked_seconds.to_string(),
                ])?;
            }
            csv.write_record([
                worker.as_str().to_string(),
                "total".to_string(),
                String::new(),
                String::new(),
                total_pause_seconds.to_string(),
                total_worked_seconds.to_string(),
            ])?;
            csv.flush()?;
        }
        ExportFormat::Json => {
            let view = ExportView {
                worker: worker.to_string(),
                start,
                end,
                rows,
                total_pause_seconds,
                total_worked_seconds,
            };
            serde_json::to_writer_pretty(&mut *writer, &view)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use punch_core::PunchKind;

    fn seed(db: &Database, worker: &WorkerId) {
        let punch = |kind, day, hour, minute| {
            let ts = Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap();
            db.append_event(worker, kind, ts, None).unwrap();
        };
        punch(PunchKind::Entry, 10, 8, 0);
        punch(PunchKind::PauseStart, 10, 12, 0);
        punch(PunchKind::PauseEnd, 10, 13, 0);
        punch(PunchKind::Exit, 10, 17, 0);
        punch(PunchKind::Entry, 11, 9, 0);
    }

    #[test]
    fn csv_export_has_header_rows_and_total() {
        let db = Database::open_in_memory().unwrap();
        let worker = WorkerId::new("maria").unwrap();
        seed(&db, &worker);

        let now = Utc.with_ymd_and_hms(2025, 3, 11, 10, 0, 0).unwrap();
        let mut out = Vec::new();
        run(&mut out, &db, &worker, Period::Week, ExportFormat::Csv, now).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "worker,date,entry,exit,pause_seconds,worked_seconds"
        );
        assert_eq!(lines[1], "maria,2025-03-10,08:00:00,17:00:00,3600,28800");
        // The in-progress day exports its elapsed time and a `-` exit.
        assert_eq!(lines[2], "maria,2025-03-11,09:00:00,-,0,3600");
        assert_eq!(lines[3], "maria,total,,,3600,32400");
    }

    #[test]
    fn json_export_carries_rows_and_totals() {
        let db = Database::open_in_memory().unwrap();
        let worker = WorkerId::new("maria").unwrap();
        seed(&db, &worker);

        let now = Utc.with_ymd_and_hms(2025, 3, 11, 10, 0, 0).unwrap();
        let mut out = Vec::new();
        run(&mut out, &db, &worker, Period::Week, ExportFormat::Json, now).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["worker"], "maria");
        let rows = value["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "2025-03-10");
        assert_eq!(rows[0]["worked_seconds"], 28_800);
        assert!(rows[1]["exit"].is_null());
        assert_eq!(value["total_worked_seconds"], 32_400);
    }
}
