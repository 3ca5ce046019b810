//! Sequencer implementation.
//!
//! The sequencer is a heartbeat-driven state machine. It does not keep
//! time itself - the caller arms the injected timer drivers and invokes
//! `tick()` once per second and `frame()` once per animation frame.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Stopped
//!                    -> (closed by host, auto-terminate)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut sequencer = Sequencer::new(Sequence::default_exercise(), false);
//! sequencer.start();
//! // From the 1 Hz driver:
//! sequencer.tick(); // Returns Some(Event) when a phase completes
//! // From the frame driver:
//! let render = sequencer.frame(50);
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sequence::{Phase, Sequence, TICK_MS};
use crate::drivers::Drivers;
use crate::events::Event;
use crate::render::{self, RenderState};

/// Haptic cue enqueued on every phase completion: three pulses,
/// 50/25/50 milliseconds.
pub const PHASE_CUE_MS: [u64; 3] = [50, 25, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Stopped,
    Running,
}

/// Core breathing sequencer.
///
/// Owns the phase sequence, the session state, and the sub-second
/// animation accumulator. All side effects go through the injected
/// [`Drivers`].
#[derive(Debug)]
pub struct Sequencer {
    /// Template the sequence is reseeded from on every reset.
    seed: Sequence,
    sequence: Sequence,
    state: SessionState,
    /// Sub-second animation clock for the current phase. Reset in the
    /// same places `elapsed_ms` is reset; letting the two drift causes
    /// visible jumps between heartbeat and frame updates.
    anim_ms: u64,
    /// Close the session on exhaustion instead of reseeding.
    auto_terminate: bool,
    session_id: Option<Uuid>,
    drivers: Drivers,
}

impl Sequencer {
    /// Create a sequencer with no-op drivers.
    pub fn new(seed: Sequence, auto_terminate: bool) -> Self {
        Self::with_drivers(seed, auto_terminate, Drivers::noop())
    }

    pub fn with_drivers(seed: Sequence, auto_terminate: bool, drivers: Drivers) -> Self {
        Self {
            sequence: seed.clone(),
            seed,
            state: SessionState::Stopped,
            anim_ms: 0,
            auto_terminate,
            session_id: None,
            drivers,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn cursor(&self) -> usize {
        self.sequence.cursor()
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.sequence.current()
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn remaining_ms(&self) -> u64 {
        self.current_phase().map(Phase::remaining_ms).unwrap_or(0)
    }

    pub fn total_ms(&self) -> u64 {
        self.current_phase().map(|p| p.duration_ms).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the current phase, on the tick clock.
    pub fn phase_progress(&self) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms() as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the whole sequence.
    pub fn sequence_progress_pct(&self) -> f64 {
        let total = self.sequence.total_duration_ms() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let elapsed = self.sequence.cumulative_ms() as f64
            + self.current_phase().map(|p| p.elapsed_ms).unwrap_or(0) as f64;
        (elapsed / total * 100.0).min(100.0)
    }

    /// Evaluate the progress model without advancing the animation
    /// clock. What `frame()` would return right now.
    pub fn render_state(&self) -> RenderState {
        render::evaluate(self.sequence.current(), self.anim_ms, self.is_running())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let phase = self.current_phase();
        Event::StateSnapshot {
            state: self.state,
            cursor: self.cursor(),
            kind: phase.map(|p| p.kind),
            label: phase.map(|p| p.kind.label().to_string()).unwrap_or_default(),
            remaining_ms: self.remaining_ms(),
            total_ms: self.total_ms(),
            sequence_progress_pct: self.sequence_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) the session. No-op while already running.
    ///
    /// Both timer drivers are armed and the light enabled before this
    /// returns, so no heartbeat can fire against a stopped session.
    pub fn start(&mut self) -> Option<Event> {
        if self.state == SessionState::Running {
            return None;
        }
        self.state = SessionState::Running;
        let session_id = *self.session_id.get_or_insert_with(Uuid::new_v4);
        self.drivers.heartbeat.arm();
        self.drivers.frame.arm();
        self.drivers.haptics.set_light(true);
        let phase = self.sequence.current()?;
        Some(Event::SessionStarted {
            session_id,
            cursor: self.sequence.cursor(),
            kind: phase.kind,
            duration_ms: phase.duration_ms,
            at: Utc::now(),
        })
    }

    /// Pause the session. No-op while already stopped.
    ///
    /// Cancels both timer drivers (idempotently) before returning.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == SessionState::Stopped {
            return None;
        }
        self.state = SessionState::Stopped;
        self.drivers.heartbeat.cancel();
        self.drivers.frame.cancel();
        self.drivers.haptics.set_light(false);
        Some(Event::SessionStopped {
            cursor: self.sequence.cursor(),
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Replace the sequence with a fresh seed: cursor 0, all elapsed
    /// time 0, session stopped.
    pub fn reset(&mut self) -> Option<Event> {
        self.stop();
        self.sequence = self.seed.clone();
        self.sequence.rewind();
        self.anim_ms = 0;
        self.session_id = None;
        Some(Event::SessionReset { at: Utc::now() })
    }

    /// Stop and ask the host to open the configuration surface.
    pub fn open_config(&mut self) -> Option<Event> {
        let stopped = self.stop();
        self.drivers.host.open_config();
        stopped
    }

    /// One-second heartbeat. Invoked by the heartbeat driver only.
    ///
    /// A stray tick against a stopped or empty sequencer is a no-op
    /// rather than a fault; the drivers are expected, not guaranteed,
    /// to be cancelled first.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        let phase = self.sequence.current_mut()?;
        phase.advance(TICK_MS);
        if !phase.is_complete() {
            return None;
        }

        let kind = phase.kind;
        let completed = self.sequence.cursor();
        self.drivers.haptics.enqueue_cue(&PHASE_CUE_MS);

        if self.sequence.advance() {
            self.anim_ms = 0;
            return Some(Event::PhaseCompleted {
                completed,
                kind,
                next: self.sequence.cursor(),
                at: Utc::now(),
            });
        }

        // Sequence exhausted.
        self.stop();
        if self.auto_terminate {
            self.drivers.host.close_session(true);
        } else {
            self.reset();
        }
        Some(Event::SequenceCompleted {
            closed: self.auto_terminate,
            at: Utc::now(),
        })
    }

    /// Animation frame. Advances the animation clock by
    /// `frame_interval_ms` while running, then evaluates the progress
    /// model. Invoked by the frame driver only.
    pub fn frame(&mut self, frame_interval_ms: u64) -> RenderState {
        if self.state == SessionState::Running {
            if let Some(phase) = self.sequence.current() {
                self.anim_ms = self
                    .anim_ms
                    .saturating_add(frame_interval_ms)
                    .min(phase.duration_ms);
            }
        }
        self.render_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::PhaseKind;

    fn two_phase_seed() -> Sequence {
        Sequence::new(vec![
            Phase::new(PhaseKind::BreatheIn, 4000),
            Phase::new(PhaseKind::BreatheOut, 4000),
        ])
        .unwrap()
    }

    #[test]
    fn starts_stopped() {
        let s = Sequencer::new(Sequence::default_exercise(), false);
        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn start_stop_toggle() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        assert!(s.start().is_some());
        assert_eq!(s.state(), SessionState::Running);
        // Starting again is a no-op.
        assert!(s.start().is_none());

        assert!(s.stop().is_some());
        assert_eq!(s.state(), SessionState::Stopped);
        assert!(s.stop().is_none());

        s.toggle();
        assert!(s.is_running());
        s.toggle();
        assert!(!s.is_running());
    }

    #[test]
    fn tick_while_stopped_is_noop() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        assert!(s.tick().is_none());
        assert_eq!(s.current_phase().unwrap().elapsed_ms, 0);
    }

    #[test]
    fn phase_advances_exactly_on_final_tick() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        for _ in 0..3 {
            assert!(s.tick().is_none());
        }
        assert_eq!(s.remaining_ms(), 1000);
        let event = s.tick().expect("fourth tick completes the phase");
        assert!(matches!(
            event,
            Event::PhaseCompleted {
                completed: 0,
                next: 1,
                ..
            }
        ));
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.current_phase().unwrap().elapsed_ms, 0);
        assert!(s.is_running());
    }

    #[test]
    fn exhaustion_without_auto_terminate_reseeds() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        for _ in 0..7 {
            s.tick();
        }
        let event = s.tick().expect("last tick exhausts the sequence");
        assert!(matches!(event, Event::SequenceCompleted { closed: false, .. }));
        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.cursor(), 0);
        assert!(s.sequence().phases().iter().all(|p| p.elapsed_ms == 0));
    }

    #[test]
    fn exhaustion_with_auto_terminate_stops_without_reset() {
        let mut s = Sequencer::new(two_phase_seed(), true);
        s.start();
        for _ in 0..7 {
            s.tick();
        }
        let event = s.tick().unwrap();
        assert!(matches!(event, Event::SequenceCompleted { closed: true, .. }));
        assert_eq!(s.state(), SessionState::Stopped);
        // No reseed: the last phase keeps its elapsed time.
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.current_phase().unwrap().remaining_ms(), 0);
    }

    #[test]
    fn reset_mid_sequence() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.cursor(), 1);
        s.reset();
        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.cursor(), 0);
        assert!(s.sequence().phases().iter().all(|p| p.elapsed_ms == 0));
        assert_eq!(s.render_state(), crate::render::RenderState::Circle {
            radius: crate::render::MIN_RADIUS,
            label: None,
        });
    }

    #[test]
    fn frame_advances_animation_only_while_running() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        let before = s.frame(50);
        // Stopped: accumulator untouched.
        assert_eq!(before, s.frame(50));

        s.start();
        s.frame(2000);
        match s.render_state() {
            RenderState::Circle { radius, .. } => assert_eq!(radius, 30.0),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn animation_clock_resets_with_phase() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        s.frame(3500);
        for _ in 0..4 {
            s.tick();
        }
        // New phase: BreatheOut starts from a full circle again.
        match s.render_state() {
            RenderState::Circle { radius, .. } => assert_eq!(radius, 50.0),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn phase_progress_tracks_ticks() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        assert_eq!(s.phase_progress(), 0.0);
        s.tick();
        assert_eq!(s.phase_progress(), 0.25);
        s.tick();
        assert_eq!(s.phase_progress(), 0.5);
    }

    #[test]
    fn sequence_progress_pct() {
        let mut s = Sequencer::new(two_phase_seed(), false);
        s.start();
        for _ in 0..4 {
            s.tick();
        }
        assert_eq!(s.sequence_progress_pct(), 50.0);
    }

    #[test]
    fn snapshot_reflects_current_phase() {
        let s = Sequencer::new(Sequence::default_exercise(), false);
        match s.snapshot() {
            Event::StateSnapshot {
                state,
                cursor,
                kind,
                remaining_ms,
                total_ms,
                ..
            } => {
                assert_eq!(state, SessionState::Stopped);
                assert_eq!(cursor, 0);
                assert_eq!(kind, Some(PhaseKind::BreatheIn));
                assert_eq!(remaining_ms, 4000);
                assert_eq!(total_ms, 4000);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }
}
