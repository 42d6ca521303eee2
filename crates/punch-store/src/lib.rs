//! Storage layer for the punch clock.
//!
//! Provides append-only persistence for punch events plus per-worker shift
//! schedules using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. For multi-threaded access, use a `Mutex<Database>`, a
//! connection pool, or one `Database` per thread.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.,
//! `2025-03-10T08:00:00Z`). This is the `chrono::DateTime<Utc>` serialization
//! and ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Append-Only Events
//!
//! The `events` table is append-only from the engine's perspective: nothing
//! here updates or deletes a punch. Concurrent submissions for the same
//! worker-day simply append; callers re-normalize on every read rather than
//! relying on a persisted order. Corrections belong to an external audit
//! path that appends replacement events.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

use punch_core::{EventId, PunchEvent, PunchKind, ShiftSchedule, WorkerId};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database is unavailable or rejected the operation.
    /// Propagated as-is; retry policy belongs to the caller.
    #[error("sqlite error: {0}")]
    Unavailable(#[from] rusqlite::Error),
    /// A stored timestamp failed to parse.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row failed validation (empty ID, unknown kind, bad metadata).
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
    /// A stored schedule failed to deserialize.
    #[error("invalid schedule for worker {worker}: {message}")]
    InvalidSchedule { worker: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            -- Events table: append-only punch registrations
            -- timestamp: ISO 8601 format (e.g., '2025-03-10T08:00:00Z')
            -- kind: one of 'entry', 'pause_start', 'pause_end', 'exit'
            -- metadata: optional opaque JSON payload (selfie ref, geolocation)
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                worker_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                metadata TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_events_worker_timestamp
                ON events(worker_id, timestamp);

            -- Shift schedules: one JSON document per worker
            CREATE TABLE IF NOT EXISTS schedules (
                worker_id TEXT PRIMARY KEY,
                schedule TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Appends a punch event, minting a fresh event ID.
    ///
    /// Append-only: existing events are never updated or deleted here.
    pub fn append_event(
        &self,
        worker: &WorkerId,
        kind: PunchKind,
        timestamp: DateTime<Utc>,
        metadata: Option<serde_json::Value>,
    ) -> Result<PunchEvent, StoreError> {
        let id = Uuid::new_v4().to_string();
        let metadata_text = metadata.as_ref().map(serde_json::Value::to_string);
        self.conn.execute(
            "INSERT INTO events (id, worker_id, kind, timestamp, metadata)
             VALUES (?, ?, ?, ?, ?)",
            params![
                id,
                worker.as_str(),
                kind.as_str(),
                format_timestamp(timestamp),
                metadata_text,
            ],
        )?;
        tracing::debug!(%worker, kind = %kind, "punch appended");

        let id = EventId::new(id).map_err(|e| StoreError::InvalidEventData {
            event_id: String::new(),
            message: e.to_string(),
        })?;
        Ok(PunchEvent {
            id,
            worker: worker.clone(),
            kind,
            timestamp,
            metadata,
        })
    }

    /// Fetches a worker's events for an inclusive date range of UTC calendar
    /// days, ordered by `(timestamp, id)`.
    ///
    /// Callers still re-normalize: the persisted order is a convenience, not
    /// a contract.
    pub fn fetch_events(
        &self,
        worker: &WorkerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PunchEvent>, StoreError> {
        if end < start {
            return Ok(Vec::new());
        }
        let range_start = format_timestamp(start.and_hms_opt(0, 0, 0).unwrap().and_utc());
        let range_end = format_timestamp(
            (end + chrono::Duration::days(1))
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
        );

        let mut stmt = self.conn.prepare(
            "
            SELECT id, worker_id, kind, timestamp, metadata
            FROM events
            WHERE worker_id = ? AND timestamp >= ? AND timestamp < ?
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![worker.as_str(), range_start, range_end], |row| {
            Ok(RawEvent {
                id: row.get(0)?,
                worker_id: row.get(1)?,
                kind: row.get(2)?,
                timestamp: row.get(3)?,
                metadata: row.get(4)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// Lists the distinct workers that have punched at least once.
    pub fn list_workers(&self) -> Result<Vec<WorkerId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT worker_id FROM events ORDER BY worker_id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut workers = Vec::new();
        for row in rows {
            let raw = row?;
            let worker = WorkerId::new(raw.clone()).map_err(|e| StoreError::InvalidEventData {
                event_id: raw,
                message: e.to_string(),
            })?;
            workers.push(worker);
        }
        Ok(workers)
    }

    /// Returns a worker's configured schedule, or the documented fallback
    /// defaults (08:00-17:00, 1h pause) when none was set upstream.
    pub fn get_schedule(&self, worker: &WorkerId) -> Result<ShiftSchedule, StoreError> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT schedule FROM schedules WHERE worker_id = ?",
                params![worker.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StoreError::InvalidSchedule {
                    worker: worker.to_string(),
                    message: e.to_string(),
                })
            }
            None => Ok(ShiftSchedule::default()),
        }
    }

    /// Stores (or replaces) a worker's schedule.
    pub fn set_schedule(
        &self,
        worker: &WorkerId,
        schedule: &ShiftSchedule,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(schedule).map_err(|e| StoreError::InvalidSchedule {
            worker: worker.to_string(),
            message: e.to_string(),
        })?;
        self.conn.execute(
            "INSERT INTO schedules (worker_id, schedule, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(worker_id) DO UPDATE SET
                schedule = excluded.schedule,
                updated_at = excluded.updated_at",
            params![worker.as_str(), json, format_timestamp(updated_at)],
        )?;
        Ok(())
    }
}

/// A row as stored, before validation.
struct RawEvent {
    id: String,
    worker_id: String,
    kind: String,
    timestamp: String,
    metadata: Option<String>,
}

impl RawEvent {
    fn into_event(self) -> Result<PunchEvent, StoreError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| StoreError::TimestampParse {
                event_id: self.id.clone(),
                timestamp: self.timestamp.clone(),
                source,
            })?;
        let invalid = |message: String| StoreError::InvalidEventData {
            event_id: self.id.clone(),
            message,
        };
        let kind: PunchKind = self.kind.parse().map_err(|e| invalid(format!("{e}")))?;
        let id = EventId::new(self.id.clone()).map_err(|e| invalid(e.to_string()))?;
        let worker = WorkerId::new(self.worker_id.clone()).map_err(|e| invalid(e.to_string()))?;
        let metadata = match &self.metadata {
            Some(text) => {
                Some(serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?)
            }
            None => None,
        };
        Ok(PunchEvent {
            id,
            worker,
            kind,
            timestamp,
            metadata,
        })
    }
}

/// Formats a timestamp for TEXT storage (RFC 3339, millisecond precision,
/// `Z`). Fixed width keeps lexicographic order equal to chronological order,
/// and milliseconds keep rapid consecutive punches distinguishable.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
