//! Per-worker shift schedules.
//!
//! A schedule is external configuration: nominal entry/exit clock times and a
//! pause policy. The engine only derives second counts from it. An
//! inconsistent schedule is an upstream setup mistake and is surfaced as an
//! error, never silently defaulted.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds in one day, for midnight-rollover correction.
const DAY_SECONDS: i64 = 24 * 60 * 60;

/// Schedule configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Scheduled pause is longer than the gross shift itself.
    #[error(
        "inconsistent schedule: pause ({pause_seconds}s) exceeds gross shift ({gross_seconds}s)"
    )]
    Inconsistent {
        gross_seconds: i64,
        pause_seconds: i64,
    },
}

/// How the mandatory break is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausePolicy {
    /// A fixed clock window, e.g. 12:00-13:00.
    Window { start: NaiveTime, end: NaiveTime },
    /// No fixed window, only a mandated duration.
    Duration { seconds: i64 },
}

/// A worker's nominal shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    /// Nominal clock-in time.
    pub entry_time: NaiveTime,
    /// Nominal clock-out time. May be "before" `entry_time`, meaning the
    /// shift crosses midnight.
    pub exit_time: NaiveTime,
    /// Mandatory break policy.
    pub pause: PausePolicy,
}

impl Default for ShiftSchedule {
    /// Fallback when nothing is configured upstream: 08:00-17:00 with a
    /// one-hour break (net 8h).
    fn default() -> Self {
        Self {
            entry_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            exit_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            pause: PausePolicy::Duration { seconds: 3600 },
        }
    }
}

impl ShiftSchedule {
    /// Entry-to-exit length in seconds. A non-positive raw difference means
    /// the shift crosses midnight, so a day is added.
    #[must_use]
    pub fn gross_shift_seconds(&self) -> i64 {
        let raw = (self.exit_time - self.entry_time).num_seconds();
        if raw <= 0 { raw + DAY_SECONDS } else { raw }
    }

    /// Seconds of mandated break per day.
    #[must_use]
    pub fn mandatory_pause_seconds(&self) -> i64 {
        match self.pause {
            PausePolicy::Window { start, end } => {
                let raw = (end - start).num_seconds();
                if raw <= 0 { raw + DAY_SECONDS } else { raw }
            }
            PausePolicy::Duration { seconds } => seconds.max(0),
        }
    }

    /// Gross shift minus the mandated break.
    ///
    /// Fails when the result would be negative: that is a configuration bug
    /// upstream, not a runtime data condition.
    pub fn net_daily_seconds(&self) -> Result<i64, ScheduleError> {
        let gross = self.gross_shift_seconds();
        let pause = self.mandatory_pause_seconds();
        let net = gross - pause;
        if net < 0 {
            return Err(ScheduleError::Inconsistent {
                gross_seconds: gross,
                pause_seconds: pause,
            });
        }
        Ok(net)
    }
}
