//! Report command for period summaries.
//!
//! This module implements `punch report` with period options (--week,
//! --last-week, --month) and output formats (human-readable, JSON).

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use punch_core::{
    AggregateOptions, BucketTotals, PeriodAggregate, ReportRow, WorkerId, aggregate_period,
    monthly_totals, report_rows, weekly_totals,
};
use punch_store::Database;
use serde::Serialize;

use super::util::{format_clock, format_hms};

/// Report period type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    LastWeek,
    Month,
}

// ========== Period Date Calculation ==========

/// Inclusive calendar-date range for a period, relative to `today`.
/// Weeks are ISO weeks, Monday through Sunday.
pub fn period_range(period: Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::Week => {
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (monday, monday + Duration::days(6))
        }
        Period::LastWeek => {
            let this_monday =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            let last_monday = this_monday - Duration::days(7);
            (last_monday, last_monday + Duration::days(6))
        }
        Period::Month => {
            let first = today.with_day(1).unwrap_or(today);
            let next_month = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            };
            let last = next_month.map_or(today, |d| d - Duration::days(1));
            (first, last)
        }
    }
}

// ========== JSON view ==========

#[derive(Debug, Serialize)]
struct SummaryView {
    total_worked_seconds: i64,
    complete_days: usize,
    average_worked_seconds_per_complete_day: f64,
    early_days: usize,
    on_time_days: usize,
    late_days: usize,
    on_time_rate: Option<f64>,
    early_rate: Option<f64>,
    overtime_seconds: i64,
}

#[derive(Debug, Serialize)]
struct ReportView {
    worker: String,
    start: NaiveDate,
    end: NaiveDate,
    rows: Vec<ReportRow>,
    summary: SummaryView,
    buckets: Vec<BucketTotals>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    worker: &WorkerId,
    period: Period,
    json: bool,
    options: &AggregateOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let (start, end) = period_range(period, now.date_naive());
    let events = db.fetch_events(worker, start, end)?;
    let schedule = db.get_schedule(worker)?;

    let aggregate = aggregate_period(worker, &schedule, events, now, options).with_context(
        || format!("schedule for {worker} is inconsistent; fix it with 'punch schedule set'"),
    )?;
    let rows = report_rows(&aggregate.days, now);
    let buckets = match period {
        Period::Week | Period::LastWeek => weekly_totals(&aggregate.days),
        Period::Month => monthly_totals(&aggregate.days),
    };

    if json {
        let view = ReportView {
            worker: worker.to_string(),
            start,
            end,
            rows,
            summary: summary_view(&aggregate),
            buckets,
        };
        serde_json::to_writer_pretty(&mut *writer, &view)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "PUNCH REPORT: {worker}, {start} to {end}")?;
    writeln!(writer)?;

    if rows.is_empty() {
        writeln!(writer, "No punches recorded in this period.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<12} {:>9} {:>9} {:>9} {:>9}",
        "Date", "Entry", "Exit", "Pause", "Worked"
    )?;
    for row in &rows {
        writeln!(
            writer,
            "{:<12} {:>9} {:>9} {:>9} {:>9}",
            row.date.to_string(),
            format_clock(row.entry),
            format_clock(row.exit),
            format_hms(row.pause_seconds),
            format_hms(row.worked_seconds),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "SUMMARY")?;
    writeln!(
        writer,
        "Complete days: {} (of {} with punches)",
        aggregate.complete_days,
        aggregate.days.len()
    )?;
    writeln!(
        writer,
        "Total worked:  {}",
        format_hms(aggregate.total_worked_seconds)
    )?;
    #[allow(clippy::cast_possible_truncation)]
    writeln!(
        writer,
        "Average/day:   {}",
        format_hms(aggregate.average_worked_seconds_per_complete_day.round() as i64)
    )?;
    writeln!(
        writer,
        "Punctuality:   {} early, {} on time, {} late{}",
        aggregate.early_days,
        aggregate.on_time_days,
        aggregate.late_days,
        aggregate
            .on_time_rate
            .map_or_else(String::new, |r| format!(" ({:.0}% on time)", r * 100.0)),
    )?;
    writeln!(
        writer,
        "Overtime:      {}",
        format_hms(aggregate.overtime_seconds)
    )?;

    if buckets.len() > 1 {
        writeln!(writer)?;
        for bucket in &buckets {
            writeln!(
                writer,
                "{}: {} over {} complete days",
                bucket.label,
                format_hms(bucket.total_worked_seconds),
                bucket.complete_days
            )?;
        }
    }

    Ok(())
}

fn summary_view(aggregate: &PeriodAggregate) -> SummaryView {
    SummaryView {
        total_worked_seconds: aggregate.total_worked_seconds,
        complete_days: aggregate.complete_days,
        average_worked_seconds_per_complete_day: aggregate.average_worked_seconds_per_complete_day,
        early_days: aggregate.early_days,
        on_time_days: aggregate.on_time_days,
        late_days: aggregate.late_days,
        on_time_rate: aggregate.on_time_rate,
        early_rate: aggregate.early_rate,
        overtime_seconds: aggregate.overtime_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use punch_core::PunchKind;

    // ========== Period ranges ==========

    #[test]
    fn week_range_runs_monday_through_sunday() {
        // 2025-03-12 is a Wednesday.
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let (start, end) = period_range(Period::Week, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 16).unwrap());
    }

    #[test]
    fn last_week_range_is_the_previous_iso_week() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let (start, end) = period_range(Period::LastWeek, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }

    #[test]
    fn month_range_covers_the_calendar_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let (start, end) = period_range(Period::Month, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn month_range_handles_december() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let (start, end) = period_range(Period::Month, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    // ========== Output ==========

    fn punch(db: &Database, worker: &WorkerId, kind: PunchKind, day: u32, hour: u32, minute: u32) {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap();
        db.append_event(worker, kind, timestamp, None).unwrap();
    }

    fn seed_two_days(db: &Database, worker: &WorkerId) {
        punch(db, worker, PunchKind::Entry, 10, 8, 0);
        punch(db, worker, PunchKind::PauseStart, 10, 12, 0);
        punch(db, worker, PunchKind::PauseEnd, 10, 13, 0);
        punch(db, worker, PunchKind::Exit, 10, 17, 0);
        punch(db, worker, PunchKind::Entry, 11, 8, 30);
        punch(db, worker, PunchKind::Exit, 11, 16, 30);
    }

    #[test]
    fn week_report_lists_days_and_totals() {
        let db = Database::open_in_memory().unwrap();
        let worker = WorkerId::new("maria").unwrap();
        seed_two_days(&db, &worker);

        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &db,
            &worker,
            Period::Week,
            false,
            &AggregateOptions::default(),
            now,
        )
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("PUNCH REPORT: maria, 2025-03-10 to 2025-03-16"));
        assert!(output.contains("2025-03-10"));
        assert!(output.contains("2025-03-11"));
        assert!(output.contains("Complete days: 2 (of 2 with punches)"));
        assert!(output.contains("Total worked:  16:00:00"));
        assert!(output.contains("Average/day:   08:00:00"));
        // 08:00 is on time, 08:30 is late under the 15 minute tolerance.
        assert!(output.contains("Punctuality:   0 early, 1 on time, 1 late (50% on time)"));
        assert!(output.contains("Overtime:      00:00:00"));
    }

    #[test]
    fn empty_period_says_so() {
        let db = Database::open_in_memory().unwrap();
        let worker = WorkerId::new("maria").unwrap();

        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &db,
            &worker,
            Period::Week,
            false,
            &AggregateOptions::default(),
            now,
        )
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("No punches recorded in this period."));
    }

    #[test]
    fn json_report_is_structured() {
        let db = Database::open_in_memory().unwrap();
        let worker = WorkerId::new("maria").unwrap();
        seed_two_days(&db, &worker);

        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &db,
            &worker,
            Period::Week,
            true,
            &AggregateOptions::default(),
            now,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["worker"], "maria");
        assert_eq!(value["start"], "2025-03-10");
        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
        assert_eq!(value["summary"]["total_worked_seconds"], 16 * 3600);
        assert_eq!(value["summary"]["complete_days"], 2);
        assert_eq!(value["buckets"][0]["label"], "2025-W11");
    }
}
