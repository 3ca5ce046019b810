use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of milliseconds the heartbeat advances a phase per tick.
pub const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    BreatheIn,
    BreatheOut,
    HoldFull,
    HoldEmpty,
}

impl PhaseKind {
    /// On-screen label for this phase.
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::BreatheIn => "Breath In",
            PhaseKind::BreatheOut => "Breath Out",
            PhaseKind::HoldFull => "Hold Full Breath",
            PhaseKind::HoldEmpty => "Hold Empty Breath",
        }
    }
}

/// One timed step of a breathing exercise.
///
/// `duration_ms` is fixed at creation; `elapsed_ms` is the single
/// mutable counter, advanced by the sequencer heartbeat and reset to 0
/// whenever the phase (re)starts. Remaining time is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// Total planned length in milliseconds. Always > 0.
    pub duration_ms: u64,
    /// Time accumulated since this phase became current.
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl Phase {
    pub fn new(kind: PhaseKind, duration_ms: u64) -> Self {
        Self {
            kind,
            duration_ms,
            elapsed_ms: 0,
        }
    }

    /// Derived remaining time. Never underflows.
    pub fn remaining_ms(&self) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed_ms)
    }

    /// Advance elapsed time, clamped to the phase duration so a
    /// delayed heartbeat cannot push `elapsed_ms` past `duration_ms`.
    pub fn advance(&mut self, delta_ms: u64) {
        self.elapsed_ms = self
            .elapsed_ms
            .saturating_add(delta_ms)
            .min(self.duration_ms);
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    fn restart(&mut self) {
        self.elapsed_ms = 0;
    }
}

/// Ordered, non-empty list of phases plus a cursor into it.
///
/// Invariant: `cursor < phases.len()` at all times. A freshly seeded
/// or reset sequence has `cursor == 0` and every phase at
/// `elapsed_ms == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    phases: Vec<Phase>,
    #[serde(default)]
    cursor: usize,
}

impl Sequence {
    /// Build a sequence from explicit phases.
    ///
    /// # Errors
    ///
    /// Returns an error if `phases` is empty or any duration is zero.
    pub fn new(phases: Vec<Phase>) -> Result<Self, ValidationError> {
        if phases.is_empty() {
            return Err(ValidationError::EmptySequence);
        }
        for (index, phase) in phases.iter().enumerate() {
            if phase.duration_ms == 0 {
                return Err(ValidationError::ZeroDuration { index });
            }
        }
        Ok(Self { phases, cursor: 0 })
    }

    /// The default exercise fixture: a slow in/out cycle with holds,
    /// four seconds per phase. Replaceable via configuration.
    pub fn default_exercise() -> Self {
        Self {
            phases: vec![
                Phase::new(PhaseKind::BreatheIn, 4000),
                Phase::new(PhaseKind::BreatheOut, 4000),
                Phase::new(PhaseKind::HoldEmpty, 4000),
                Phase::new(PhaseKind::BreatheIn, 4000),
                Phase::new(PhaseKind::HoldFull, 4000),
            ],
            cursor: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Phase> {
        self.phases.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut Phase> {
        self.phases.get_mut(self.cursor)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_ms).sum()
    }

    /// Cumulative milliseconds of all phases before the cursor.
    pub fn cumulative_ms(&self) -> u64 {
        self.phases
            .iter()
            .take(self.cursor)
            .map(|p| p.duration_ms)
            .sum()
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Move the cursor to the next phase, restarting it.
    ///
    /// Returns `false` when the current phase was the last one; the
    /// cursor stays on the last phase so the index invariant holds
    /// while the caller decides between reset and termination.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.phases.len() {
            self.cursor += 1;
            self.phases[self.cursor].restart();
            true
        } else {
            false
        }
    }

    /// Cursor back to 0, every phase's elapsed time back to 0.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        for phase in &mut self.phases {
            phase.restart();
        }
    }
}
