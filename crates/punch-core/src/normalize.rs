//! Chronological normalization of punch events.
//!
//! The store appends concurrently-submitted punches in arrival order, which
//! is not necessarily chronological. Every read path re-normalizes instead of
//! trusting a persisted order.

use crate::event::PunchEvent;

/// Sorts events ascending by `(timestamp, id)`.
///
/// Ties on the timestamp keep a stable relative order via the ID. No event is
/// dropped or mutated, and the operation is idempotent. Kind validation is
/// not a concern here: an unrecognized kind can never be constructed (it is
/// rejected when parsing [`crate::PunchKind`]).
pub fn normalize_events(mut events: Vec<PunchEvent>) -> Vec<PunchEvent> {
    events.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PunchKind;
    use crate::event::tests::event_at;

    #[test]
    fn orders_by_timestamp() {
        let events = vec![
            event_at("c", PunchKind::Exit, 17, 0),
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("b", PunchKind::PauseStart, 12, 0),
        ];

        let sorted = normalize_events(events);
        let kinds: Vec<_> = sorted.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![PunchKind::Entry, PunchKind::PauseStart, PunchKind::Exit]
        );
    }

    #[test]
    fn breaks_timestamp_ties_by_id() {
        let events = vec![
            event_at("b", PunchKind::Exit, 8, 0),
            event_at("a", PunchKind::Entry, 8, 0),
        ];

        let sorted = normalize_events(events);
        assert_eq!(sorted[0].id.as_str(), "a");
        assert_eq!(sorted[1].id.as_str(), "b");
    }

    #[test]
    fn is_idempotent() {
        let events = vec![
            event_at("b", PunchKind::PauseStart, 12, 0),
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("c", PunchKind::Entry, 8, 0),
        ];

        let once = normalize_events(events);
        let twice = normalize_events(once.clone());
        let once_ids: Vec<_> = once.iter().map(|e| e.id.as_str()).collect();
        let twice_ids: Vec<_> = twice.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn drops_nothing() {
        let events = vec![
            event_at("a", PunchKind::Entry, 8, 0),
            event_at("b", PunchKind::Entry, 8, 0),
            event_at("c", PunchKind::Entry, 8, 0),
        ];

        assert_eq!(normalize_events(events).len(), 3);
    }
}
