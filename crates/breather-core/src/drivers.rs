//! Capability traits for the sequencer's external collaborators.
//!
//! The sequencer decides *when* timers run, cues fire, and the session
//! closes; these traits are how it tells the platform. Injecting them
//! keeps the state machine deterministic in tests -- no real time has
//! to pass to observe arm/cancel/cue ordering.

use std::fmt;

/// A periodic timer the sequencer can arm and cancel.
///
/// Contract for implementations: `cancel` on an already-cancelled
/// timer is a no-op, and `arm` while already pending extends the
/// pending schedule rather than double-firing.
pub trait TickTimer {
    fn arm(&mut self);
    fn cancel(&mut self);
}

/// Haptic and backlight output.
pub trait Haptics {
    /// Queue a vibration pattern; each entry is a pulse duration in
    /// milliseconds.
    fn enqueue_cue(&mut self, pattern: &[u64]);
    fn set_light(&mut self, on: bool);
}

/// The surrounding session/window controller.
pub trait SessionHost {
    /// Close the session; `success` marks a completed exercise.
    fn close_session(&mut self, success: bool);
    /// Open the configuration surface.
    fn open_config(&mut self);
}

/// The full driver set injected into a [`Sequencer`](crate::Sequencer).
pub struct Drivers {
    /// 1 Hz countdown driver.
    pub heartbeat: Box<dyn TickTimer>,
    /// Higher-frequency animation driver.
    pub frame: Box<dyn TickTimer>,
    pub haptics: Box<dyn Haptics>,
    pub host: Box<dyn SessionHost>,
}

impl Drivers {
    /// Drivers that accept every request and do nothing. Suitable for
    /// headless use and as a test baseline.
    pub fn noop() -> Self {
        Self {
            heartbeat: Box::new(NoopTimer),
            frame: Box::new(NoopTimer),
            haptics: Box::new(NoopHaptics),
            host: Box::new(NoopHost),
        }
    }
}

impl Default for Drivers {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Drivers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drivers").finish_non_exhaustive()
    }
}

struct NoopTimer;

impl TickTimer for NoopTimer {
    fn arm(&mut self) {}
    fn cancel(&mut self) {}
}

struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn enqueue_cue(&mut self, _pattern: &[u64]) {}
    fn set_light(&mut self, _on: bool) {}
}

struct NoopHost;

impl SessionHost for NoopHost {
    fn close_session(&mut self, _success: bool) {}
    fn open_config(&mut self) {}
}
