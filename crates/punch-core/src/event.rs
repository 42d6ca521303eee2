//! Punch events: the raw timestamped worker actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventId, ValidationError, WorkerId};

/// A single punch registered by a worker.
///
/// Events are immutable once created. Corrections happen through an external
/// audit path that appends a replacement event; the engine never mutates or
/// deletes what it reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchEvent {
    /// Unique identifier, also the tiebreaker for identical timestamps.
    pub id: EventId,
    /// The worker who registered the punch.
    pub worker: WorkerId,
    /// Which of the four punch actions this is.
    pub kind: PunchKind,
    /// When the punch happened (always UTC).
    pub timestamp: DateTime<Utc>,
    /// Opaque payload (selfie reference, geolocation). Passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// The four recognized punch actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchKind {
    /// Start of the working day.
    Entry,
    /// Start of a break.
    PauseStart,
    /// End of a break.
    PauseEnd,
    /// End of the working day.
    Exit,
}

impl PunchKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::PauseStart => "pause_start",
            Self::PauseEnd => "pause_end",
            Self::Exit => "exit",
        }
    }
}

impl std::fmt::Display for PunchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PunchKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(Self::Entry),
            "pause_start" => Ok(Self::PauseStart),
            "pause_end" => Ok(Self::PauseEnd),
            "exit" => Ok(Self::Exit),
            _ => Err(ValidationError::UnknownPunchKind {
                value: s.to_string(),
            }),
        }
    }
}
