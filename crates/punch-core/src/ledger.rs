//! The day ledger: status, worked time, and shift predictions.
//!
//! This is the single consolidated implementation of the computation that
//! used to be re-derived (with slightly different bugs) by every view that
//! touched punch data. It is a pure function of the event set, the schedule,
//! and an injected `now`; callers re-run it whenever either changes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{PunchEvent, PunchKind};
use crate::normalize::normalize_events;
use crate::pause::{PauseInterval, pair_pauses};
use crate::schedule::{PausePolicy, ScheduleError, ShiftSchedule};
use crate::types::WorkerId;

/// Where the worker stands right now, derived from the last punch of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// No punches yet today.
    Awaiting,
    /// Clocked in, not on a break.
    Working,
    /// On a break.
    OnPause,
    /// Clocked out.
    Finished,
}

impl DayStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Awaiting => "awaiting",
            Self::Working => "working",
            Self::OnPause => "on_pause",
            Self::Finished => "finished",
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The computed summary of one worker-day.
///
/// A pure projection: never persisted, recomputed on demand from the
/// immutable event set plus `now` for in-progress days.
#[derive(Debug, Clone)]
pub struct DayLedger {
    pub worker: WorkerId,
    pub date: NaiveDate,
    /// First `entry` punch of the day, if any.
    pub entry: Option<PunchEvent>,
    /// Last `exit` punch of the day, if any.
    pub exit: Option<PunchEvent>,
    /// Breaks in chronological order; the last one may still be open.
    pub pauses: Vec<PauseInterval>,
    pub status: DayStatus,
    /// Elapsed time net of pauses, clamped to zero.
    pub worked_seconds: i64,
}

impl DayLedger {
    /// Computes the ledger for one worker-day.
    ///
    /// `events` may arrive in any order; they are normalized here because the
    /// store never guarantees a canonical order. `now` is the observation
    /// instant for in-progress days; a closed day ignores it entirely.
    ///
    /// Missing exits, unterminated pauses, and out-of-order timestamps are
    /// normal field data, never errors. Negative raw differences (clock skew)
    /// clamp to zero rather than propagating.
    #[must_use]
    pub fn compute(
        worker: WorkerId,
        date: NaiveDate,
        events: Vec<PunchEvent>,
        now: DateTime<Utc>,
    ) -> Self {
        let events = normalize_events(events);
        let pauses = pair_pauses(&events);

        let entry = events
            .iter()
            .find(|e| e.kind == PunchKind::Entry)
            .cloned();
        let exit = events
            .iter()
            .rfind(|e| e.kind == PunchKind::Exit)
            .cloned();

        let status = events.last().map_or(DayStatus::Awaiting, |last| match last.kind {
            PunchKind::Entry | PunchKind::PauseEnd => DayStatus::Working,
            PunchKind::PauseStart => DayStatus::OnPause,
            PunchKind::Exit => DayStatus::Finished,
        });

        let worked_seconds = match (&entry, &exit) {
            (None, _) => 0,
            (Some(entry), None) => {
                let elapsed = (now - entry.timestamp).num_seconds();
                (elapsed - paused_seconds(&pauses, now)).max(0)
            }
            (Some(entry), Some(exit)) => {
                // A closed day: the observation instant is the exit punch, so
                // the result is independent of `now`. Intervals are capped at
                // the exit timestamp; one starting after it contributes zero.
                let elapsed = (exit.timestamp - entry.timestamp).num_seconds();
                (elapsed - paused_seconds(&pauses, exit.timestamp)).max(0)
            }
        };

        Self {
            worker,
            date,
            entry,
            exit,
            pauses,
            status,
            worked_seconds,
        }
    }

    /// Whether both an entry and an exit were punched.
    ///
    /// Only complete days count toward historical totals; "still working" is
    /// not the same as "worked zero".
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.entry.is_some() && self.exit.is_some()
    }

    /// Total pause seconds as observed at `now`.
    #[must_use]
    pub fn paused_seconds_at(&self, now: DateTime<Utc>) -> i64 {
        paused_seconds(&self.pauses, now)
    }

    /// The open pause, if the worker is currently on a break.
    #[must_use]
    pub fn open_pause(&self) -> Option<&PauseInterval> {
        self.pauses.last().filter(|p| !p.is_closed())
    }
}

fn paused_seconds(pauses: &[PauseInterval], now: DateTime<Utc>) -> i64 {
    pauses.iter().map(|p| p.seconds_at(now)).sum()
}

/// Forward-looking shift numbers for an in-progress day.
///
/// Only meaningful while the worker is `Working` or `OnPause`; [`Self::project`]
/// returns `None` once the day is finished or before the first punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftOutlook {
    /// Scheduled net seconds still to work.
    pub remaining_work_seconds: i64,
    /// Mandated break seconds not yet taken. Zero unless currently on a break.
    pub remaining_pause_seconds: i64,
    /// When the current break is expected to end. `None` unless on a break.
    pub predicted_pause_end: Option<DateTime<Utc>>,
    /// When the worker is expected to clock out.
    pub predicted_exit: DateTime<Utc>,
    /// The scheduled net is already met. Predictions are still produced;
    /// presentation decides how to flag it.
    pub shift_complete: bool,
}

impl ShiftOutlook {
    /// Projects pause-end and shift-end instants for an in-progress ledger.
    ///
    /// Errors only on an inconsistent schedule (negative net after rollover
    /// correction) — a configuration bug, not a data condition.
    pub fn project(
        ledger: &DayLedger,
        schedule: &ShiftSchedule,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, ScheduleError> {
        let net = schedule.net_daily_seconds()?;

        if ledger.entry.is_none() || ledger.exit.is_some() {
            return Ok(None);
        }

        let remaining_work_seconds = (net - ledger.worked_seconds).max(0);
        let mandatory = schedule.mandatory_pause_seconds();

        let (remaining_pause_seconds, predicted_pause_end) = match ledger.open_pause() {
            Some(open) => {
                let paused_so_far = ledger.paused_seconds_at(now);
                let remaining = (mandatory - paused_so_far).max(0);
                let additive = open.start.timestamp + chrono::Duration::seconds(mandatory);
                // A fixed schedule window wins over the additive estimate as
                // long as `now` has not passed it yet.
                let predicted = match schedule.pause {
                    PausePolicy::Window { end, .. } => {
                        let window_end = ledger.date.and_time(end).and_utc();
                        if now < window_end { window_end } else { additive }
                    }
                    PausePolicy::Duration { .. } => additive,
                };
                (remaining, Some(predicted))
            }
            None => (0, None),
        };

        let mut predicted_exit = now + chrono::Duration::seconds(remaining_work_seconds);
        if ledger.status == DayStatus::OnPause {
            predicted_exit += chrono::Duration::seconds(remaining_pause_seconds);
        }

        Ok(Some(Self {
            remaining_work_seconds,
            remaining_pause_seconds,
            predicted_pause_end,
            predicted_exit,
            shift_complete: remaining_work_seconds == 0,
        }))
    }
}

/// Advisory conditions derived from an in-progress ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAlert {
    /// The current break has run unusually long.
    LongPause { seconds: i64 },
    /// A long stretch of work with no break registered today.
    NoPauseRegistered { worked_seconds: i64 },
}

/// Break length after which [`LedgerAlert::LongPause`] fires (2h).
pub const LONG_PAUSE_SECONDS: i64 = 2 * 3600;

/// Worked time without any break after which
/// [`LedgerAlert::NoPauseRegistered`] fires (6h).
pub const NO_PAUSE_WORKED_SECONDS: i64 = 6 * 3600;

/// Checks the advisory conditions for a ledger at `now`.
#[must_use]
pub fn check_alerts(ledger: &DayLedger, now: DateTime<Utc>) -> Vec<LedgerAlert> {
    let mut alerts = Vec::new();

    if ledger.status == DayStatus::OnPause {
        if let Some(open) = ledger.open_pause() {
            let seconds = open.seconds_at(now);
            if seconds > LONG_PAUSE_SECONDS {
                alerts.push(LedgerAlert::LongPause { seconds });
            }
        }
    }

    if ledger.status == DayStatus::Working
        && ledger.pauses.is_empty()
        && ledger.worked_seconds > NO_PAUSE_WORKED_SECONDS
    {
        alerts.push(LedgerAlert::NoPauseRegistered {
            worked_seconds: ledger.worked_seconds,
        });
    }

    alerts
}
