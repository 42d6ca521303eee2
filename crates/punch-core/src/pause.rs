//! Pause interval pairing.
//!
//! Derives break intervals from chronologically ordered punch events. Field
//! data is messy: pauses get started twice or never closed. The pairer
//! tolerates both without crashing, which is the one place this logic used to
//! corrupt totals when it was re-implemented per view.

use chrono::{DateTime, Utc};

use crate::event::{PunchEvent, PunchKind};

/// A derived break: a `pause_start` punch and, if the worker has returned,
/// the matching `pause_end` punch. Never persisted.
#[derive(Debug, Clone)]
pub struct PauseInterval {
    pub start: PunchEvent,
    /// `None` while the pause is still ongoing.
    pub end: Option<PunchEvent>,
}

impl PauseInterval {
    /// Whether the pause has a matching end punch.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Seconds spent in this pause as observed at `now`.
    ///
    /// `now` is a hard cap: an interval still open (or closed after `now`)
    /// counts only up to `now`, and one that starts at or after `now`
    /// contributes zero. The clamp also keeps a pause that "started in the
    /// future" (clock skew) from going negative.
    #[must_use]
    pub fn seconds_at(&self, now: DateTime<Utc>) -> i64 {
        let end = self
            .end
            .as_ref()
            .map_or(now, |event| event.timestamp.min(now));
        (end - self.start.timestamp).num_seconds().max(0)
    }
}

/// Pairing state: either between pauses or holding a pending start.
enum PairState {
    NoPause,
    InPause(PunchEvent),
}

/// Scans chronologically ordered events once and pairs pause punches.
///
/// * `pause_start` then `pause_end` emits a closed interval.
/// * A second `pause_start` while one is already pending is malformed input
///   (a missing end); the new start is ignored so no zero-length interval is
///   fabricated.
/// * A `pause_end` with no pending start is likewise ignored.
/// * A pending start left at the end of the scan emits an open interval: the
///   worker is on a break right now.
///
/// `entry` and `exit` punches are not this component's business.
pub fn pair_pauses(events: &[PunchEvent]) -> Vec<PauseInterval> {
    let mut intervals = Vec::new();
    let mut state = PairState::NoPause;

    for event in events {
        match (&state, event.kind) {
            (PairState::NoPause, PunchKind::PauseStart) => {
                state = PairState::InPause(event.clone());
            }
            (PairState::InPause(start), PunchKind::PauseEnd) => {
                intervals.push(PauseInterval {
                    start: start.clone(),
                    end: Some(event.clone()),
                });
                state = PairState::NoPause;
            }
            (PairState::InPause(start), PunchKind::PauseStart) => {
                tracing::debug!(
                    pending = %start.id,
                    ignored = %event.id,
                    "pause started twice without an end; ignoring the second start"
                );
            }
            (PairState::NoPause, PunchKind::PauseEnd) => {
                tracing::debug!(ignored = %event.id, "pause end without a start; ignoring");
            }
            _ => {}
        }
    }

    if let PairState::InPause(start) = state {
        intervals.push(PauseInterval { start, end: None });
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::event_at;
    use chrono::TimeZone;

    fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn pairs_closed_interval() {
        let events = vec![
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("b", PunchKind::PauseStart, 12, 0),
            event_at("c", PunchKind::PauseEnd, 13, 0),
            event_at("d", PunchKind::Exit, 17, 0),
        ];

        let intervals = pair_pauses(&events);
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].is_closed());
        assert_eq!(intervals[0].seconds_at(utc(23, 0)), 3600);
    }

    #[test]
    fn trailing_start_is_open_interval() {
        let events = vec![
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("b", PunchKind::PauseStart, 12, 0),
        ];

        let intervals = pair_pauses(&events);
        assert_eq!(intervals.len(), 1);
        assert!(!intervals[0].is_closed());
        // Open pause counts up to the observation instant.
        assert_eq!(intervals[0].seconds_at(utc(12, 30)), 1800);
    }

    #[test]
    fn double_start_ignores_second() {
        let events = vec![
            event_at("a", PunchKind::PauseStart, 12, 0),
            event_at("b", PunchKind::PauseStart, 12, 30),
            event_at("c", PunchKind::PauseEnd, 13, 0),
        ];

        let intervals = pair_pauses(&events);
        assert_eq!(intervals.len(), 1);
        // The surviving interval runs from the first start.
        assert_eq!(intervals[0].start.id.as_str(), "a");
        assert_eq!(intervals[0].seconds_at(utc(23, 0)), 3600);
    }

    #[test]
    fn stray_end_is_ignored() {
        let events = vec![
            event_at("a", PunchKind::PauseEnd, 9, 0),
            event_at("b", PunchKind::PauseStart, 12, 0),
            event_at("c", PunchKind::PauseEnd, 12, 45),
        ];

        let intervals = pair_pauses(&events);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].seconds_at(utc(23, 0)), 2700);
    }

    #[test]
    fn entry_and_exit_do_not_affect_pairing() {
        let events = vec![
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("b", PunchKind::Exit, 17, 0),
        ];

        assert!(pair_pauses(&events).is_empty());
    }

    #[test]
    fn pairing_is_deterministic() {
        let events = vec![
            event_at("a", PunchKind::PauseStart, 10, 0),
            event_at("b", PunchKind::PauseEnd, 10, 15),
            event_at("c", PunchKind::PauseStart, 12, 0),
        ];

        let first = pair_pauses(&events);
        let second = pair_pauses(&events);
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(&second) {
            assert_eq!(x.start.id, y.start.id);
            assert_eq!(
                x.end.as_ref().map(|e| e.id.clone()),
                y.end.as_ref().map(|e| e.id.clone())
            );
        }
    }

    #[test]
    fn closed_interval_is_capped_at_observation_instant() {
        let events = vec![
            event_at("a", PunchKind::PauseStart, 12, 0),
            event_at("b", PunchKind::PauseEnd, 13, 0),
        ];
        let intervals = pair_pauses(&events);
        // Observed mid-pause: only the elapsed half counts.
        assert_eq!(intervals[0].seconds_at(utc(12, 30)), 1800);
        // Observed before the pause began: nothing counts.
        assert_eq!(intervals[0].seconds_at(utc(11, 0)), 0);
    }

    #[test]
    fn open_interval_clamps_clock_skew() {
        let events = vec![event_at("a", PunchKind::PauseStart, 12, 0)];
        let intervals = pair_pauses(&events);
        // Observed "before" the pause started: clamp, don't go negative.
        assert_eq!(intervals[0].seconds_at(utc(11, 0)), 0);
    }
}
