//! Multi-day aggregation for reports and analytics.
//!
//! Rolls per-day ledgers into period totals, punctuality rates, and overtime.
//! Days are bucketed by the UTC calendar date of each punch; weekly grouping
//! is ISO weeks (Monday start) and monthly grouping is calendar months, both
//! locale-independent.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::event::PunchEvent;
use crate::ledger::DayLedger;
use crate::schedule::{ScheduleError, ShiftSchedule};
use crate::types::WorkerId;

/// Tunable aggregation rules.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Grace period after the scheduled entry before an arrival counts as
    /// late. Default: 15 minutes.
    pub on_time_tolerance_seconds: i64,

    /// Whether strictly-early arrivals count toward the on-time rate.
    /// The three-way partition is always reported; this only affects the
    /// rate. Default: true.
    pub early_counts_as_on_time: bool,

    /// Daily overtime threshold. `None` means the worker's scheduled
    /// `net_daily_seconds`, which is the correct default; a fixed legal
    /// threshold can be forced here.
    pub overtime_threshold_seconds: Option<i64>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            on_time_tolerance_seconds: 15 * 60,
            early_counts_as_on_time: true,
            overtime_threshold_seconds: None,
        }
    }
}

/// Which side of the scheduled entry an arrival fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Punctuality {
    /// Strictly before the scheduled entry.
    Early,
    /// At or after the scheduled entry, within tolerance.
    OnTime,
    /// Past the tolerance.
    Late,
}

/// Rolled-up totals and rates for a date range.
#[derive(Debug, Clone)]
pub struct PeriodAggregate {
    /// Per-day ledgers in date order (every day that has at least one punch).
    pub days: Vec<DayLedger>,
    /// Sum of worked seconds over complete days only. A day without an exit
    /// contributes nothing; "still working" is not "worked zero".
    pub total_worked_seconds: i64,
    /// Number of days with both entry and exit.
    pub complete_days: usize,
    /// Mean worked seconds per complete day; zero when there are none.
    pub average_worked_seconds_per_complete_day: f64,
    /// Days whose entry was strictly early.
    pub early_days: usize,
    /// Days whose entry was on time (not early, within tolerance).
    pub on_time_days: usize,
    /// Days whose entry was late.
    pub late_days: usize,
    /// Fraction of entry-bearing days counted on time under the configured
    /// rule. `None` when no day has an entry.
    pub on_time_rate: Option<f64>,
    /// Fraction of entry-bearing days strictly early. `None` when no day has
    /// an entry.
    pub early_rate: Option<f64>,
    /// Sum over complete days of time worked past the daily threshold.
    pub overtime_seconds: i64,
}

/// Computes per-day ledgers for every day in the event set and rolls them up.
///
/// Events may span any number of days and arrive in any order. `now` only
/// matters for in-progress days (it flows into their ledgers); complete days
/// are unaffected. Fails only on an inconsistent schedule.
pub fn aggregate_period(
    worker: &WorkerId,
    schedule: &ShiftSchedule,
    events: Vec<PunchEvent>,
    now: DateTime<Utc>,
    options: &AggregateOptions,
) -> Result<PeriodAggregate, ScheduleError> {
    let net = schedule.net_daily_seconds()?;
    let overtime_threshold = options.overtime_threshold_seconds.unwrap_or(net);

    let mut by_date: BTreeMap<NaiveDate, Vec<PunchEvent>> = BTreeMap::new();
    for event in events {
        by_date
            .entry(event.timestamp.date_naive())
            .or_default()
            .push(event);
    }

    let mut days: Vec<DayLedger> = by_date
        .into_par_iter()
        .map(|(date, day_events)| DayLedger::compute(worker.clone(), date, day_events, now))
        .collect();
    days.sort_by_key(|ledger| ledger.date);

    let complete: Vec<&DayLedger> = days.iter().filter(|d| d.is_complete()).collect();
    let total_worked_seconds: i64 = complete.iter().map(|d| d.worked_seconds).sum();
    let overtime_seconds: i64 = complete
        .iter()
        .map(|d| (d.worked_seconds - overtime_threshold).max(0))
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let average_worked_seconds_per_complete_day = if complete.is_empty() {
        0.0
    } else {
        total_worked_seconds as f64 / complete.len() as f64
    };
    let complete_days = complete.len();

    let mut early_days = 0;
    let mut on_time_days = 0;
    let mut late_days = 0;
    for ledger in &days {
        let Some(entry) = &ledger.entry else { continue };
        match classify_punctuality(
            entry.timestamp,
            schedule.entry_time,
            options.on_time_tolerance_seconds,
        ) {
            Punctuality::Early => early_days += 1,
            Punctuality::OnTime => on_time_days += 1,
            Punctuality::Late => late_days += 1,
        }
    }

    let entry_days = early_days + on_time_days + late_days;
    let on_time_numerator = if options.early_counts_as_on_time {
        on_time_days + early_days
    } else {
        on_time_days
    };
    #[allow(clippy::cast_precision_loss)]
    let rate = |numerator: usize| {
        if entry_days == 0 {
            None
        } else {
            Some(numerator as f64 / entry_days as f64)
        }
    };
    let on_time_rate = rate(on_time_numerator);
    let early_rate = rate(early_days);

    Ok(PeriodAggregate {
        days,
        total_worked_seconds,
        complete_days,
        average_worked_seconds_per_complete_day,
        early_days,
        on_time_days,
        late_days,
        on_time_rate,
        early_rate,
        overtime_seconds,
    })
}

/// Buckets one arrival against the scheduled entry clock time.
///
/// Compared as clock times (seconds from midnight, UTC), matching how the
/// schedule itself is expressed. The comparison never wraps: for a
/// midnight-crossing schedule (entry 22:00), an arrival shortly after
/// midnight classifies as `Early`, not `Late`.
#[must_use]
pub fn classify_punctuality(
    arrival: DateTime<Utc>,
    scheduled_entry: NaiveTime,
    tolerance_seconds: i64,
) -> Punctuality {
    let arrival_seconds = i64::from(arrival.time().num_seconds_from_midnight());
    let scheduled_seconds = i64::from(scheduled_entry.num_seconds_from_midnight());

    if arrival_seconds < scheduled_seconds {
        Punctuality::Early
    } else if arrival_seconds <= scheduled_seconds + tolerance_seconds {
        Punctuality::OnTime
    } else {
        Punctuality::Late
    }
}

// ========== Grouping ==========

/// Totals for one weekly or monthly bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotals {
    /// `2025-W11` for ISO weeks, `2025-03` for months.
    pub label: String,
    pub total_worked_seconds: i64,
    pub complete_days: usize,
    pub average_worked_seconds_per_complete_day: f64,
}

/// Groups ledgers into ISO-week buckets (Monday start), in order.
#[must_use]
pub fn weekly_totals(days: &[DayLedger]) -> Vec<BucketTotals> {
    bucket_totals(days, |date| {
        let week = date.iso_week();
        format!("{}-W{:02}", week.year(), week.week())
    })
}

/// Groups ledgers into calendar-month buckets, in order.
#[must_use]
pub fn monthly_totals(days: &[DayLedger]) -> Vec<BucketTotals> {
    bucket_totals(days, |date| format!("{}-{:02}", date.year(), date.month()))
}

fn bucket_totals(days: &[DayLedger], label: impl Fn(NaiveDate) -> String) -> Vec<BucketTotals> {
    let mut buckets: BTreeMap<String, (i64, usize)> = BTreeMap::new();
    for ledger in days.iter().filter(|d| d.is_complete()) {
        let (total, count) = buckets.entry(label(ledger.date)).or_insert((0, 0));
        *total += ledger.worked_seconds;
        *count += 1;
    }

    buckets
        .into_iter()
        .map(|(label, (total_worked_seconds, complete_days))| {
            #[allow(clippy::cast_precision_loss)]
            let average = if complete_days == 0 {
                0.0
            } else {
                total_worked_seconds as f64 / complete_days as f64
            };
            BucketTotals {
                label,
                total_worked_seconds,
                complete_days,
                average_worked_seconds_per_complete_day: average,
            }
        })
        .collect()
}

// ========== Report rows ==========

/// One per-day row of the stable input contract for external formatters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    /// Entry time of day, `None` rendered as `-` downstream.
    pub entry: Option<NaiveTime>,
    /// Exit time of day, `None` rendered as `-` downstream.
    pub exit: Option<NaiveTime>,
    pub pause_seconds: i64,
    pub worked_seconds: i64,
}

/// Builds the per-day rows for a set of ledgers.
///
/// Pause time on a still-open day is observed at `now`; on a closed day it is
/// capped at the exit punch.
#[must_use]
pub fn report_rows(days: &[DayLedger], now: DateTime<Utc>) -> Vec<ReportRow> {
    days.iter()
        .map(|ledger| {
            let observed_at = ledger.exit.as_ref().map_or(now, |exit| exit.timestamp);
            ReportRow {
                date: ledger.date,
                entry: ledger.entry.as_ref().map(|e| e.timestamp.time()),
                exit: ledger.exit.as_ref().map(|e| e.timestamp.time()),
                pause_seconds: ledger.paused_seconds_at(observed_at),
                worked_seconds: ledger.worked_seconds,
            }
        })
        .collect()
}
