use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sequencer::{PhaseKind, SessionState};

/// Every state change in the sequencer produces an Event.
/// The CLI prints them; a GUI would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        cursor: usize,
        kind: PhaseKind,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        cursor: usize,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran down and the cursor moved to the next one.
    /// The haptic cue has already been enqueued when this is observed.
    PhaseCompleted {
        completed: usize,
        kind: PhaseKind,
        next: usize,
        at: DateTime<Utc>,
    },
    /// The last phase ran down. `closed` tells whether the session was
    /// handed to the host for termination or reseeded for a manual
    /// restart.
    SequenceCompleted {
        closed: bool,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        cursor: usize,
        kind: Option<PhaseKind>,
        label: String,
        remaining_ms: u64,
        total_ms: u64,
        sequence_progress_pct: f64,
        at: DateTime<Utc>,
    },
}
