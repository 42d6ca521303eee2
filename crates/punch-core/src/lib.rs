//! Time-ledger engine for the punch clock.
//!
//! This crate contains the pure domain logic:
//! - Normalization: chronological ordering of raw punch events
//! - Pairing: deriving pause intervals from `pause_start`/`pause_end` punches
//! - Ledger: per-day status, worked time, and shift predictions
//! - Aggregation: multi-day totals, punctuality, and overtime for reports
//!
//! Everything here is a deterministic function of its inputs: `now` is always
//! an injected parameter, never a wall-clock read, so the engine is safe to
//! recompute from any number of concurrent callers and trivially testable.

pub mod aggregate;
pub mod event;
pub mod ledger;
pub mod normalize;
pub mod pause;
pub mod schedule;
mod types;

pub use aggregate::{
    AggregateOptions, BucketTotals, PeriodAggregate, Punctuality, ReportRow, aggregate_period,
    classify_punctuality, monthly_totals, report_rows, weekly_totals,
};
pub use event::{PunchEvent, PunchKind};
pub use ledger::{DayLedger, DayStatus, LedgerAlert, ShiftOutlook, check_alerts};
pub use normalize::normalize_events;
pub use pause::{PauseInterval, pair_pauses};
pub use schedule::{PausePolicy, ScheduleError, ShiftSchedule};
pub use types::{EventId, ValidationError, WorkerId};
