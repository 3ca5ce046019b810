//! Progress model: pure mapping from phase state to renderable values.
//!
//! Evaluated once per animation frame, at a higher frequency than the
//! one-second heartbeat. The animation clock passed in here is the
//! sequencer's sub-second accumulator, not the tick counter -- see
//! [`Sequencer::frame`](crate::Sequencer::frame).

use serde::Serialize;

use crate::sequencer::{Phase, PhaseKind};

/// Smallest breath-circle radius, drawn at an empty breath.
pub const MIN_RADIUS: f64 = 10.0;
/// Largest breath-circle radius, drawn at a full breath.
pub const MAX_RADIUS: f64 = 50.0;

/// What the renderer should draw this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RenderState {
    /// No current phase; draw nothing.
    Empty,
    /// Filled circle for the breathe phases.
    Circle {
        radius: f64,
        label: Option<&'static str>,
    },
    /// Radial sweep for the hold phases, from `start_deg` to 360.
    Arc {
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        label: &'static str,
    },
}

/// Linear interpolation between `a` and `b` by `t` in `[0, 1]`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Fraction of the phase that has elapsed on the animation clock,
/// clamped to `[0, 1]` even when frames arrive late.
pub fn progress(duration_ms: u64, anim_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    let remaining = duration_ms.saturating_sub(anim_ms);
    let p = 1.0 - remaining as f64 / duration_ms as f64;
    p.clamp(0.0, 1.0)
}

/// Map the current phase to presentation values.
///
/// Breathe phases grow or shrink the circle and show their label only
/// while the session is running; hold phases sweep an arc at the
/// matching extreme radius and keep their label up even while paused.
pub fn evaluate(phase: Option<&Phase>, anim_ms: u64, running: bool) -> RenderState {
    let Some(phase) = phase else {
        return RenderState::Empty;
    };
    let p = progress(phase.duration_ms, anim_ms);
    match phase.kind {
        PhaseKind::BreatheIn => RenderState::Circle {
            radius: lerp(MIN_RADIUS, MAX_RADIUS, p),
            label: running.then(|| phase.kind.label()),
        },
        PhaseKind::BreatheOut => RenderState::Circle {
            radius: lerp(MIN_RADIUS, MAX_RADIUS, 1.0 - p),
            label: running.then(|| phase.kind.label()),
        },
        PhaseKind::HoldEmpty => RenderState::Arc {
            radius: MIN_RADIUS,
            start_deg: p * 360.0,
            end_deg: 360.0,
            label: phase.kind.label(),
        },
        PhaseKind::HoldFull => RenderState::Arc {
            radius: MAX_RADIUS,
            start_deg: p * 360.0,
            end_deg: 360.0,
            label: phase.kind.label(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(kind: PhaseKind, duration_ms: u64) -> Phase {
        Phase::new(kind, duration_ms)
    }

    #[test]
    fn breathe_in_halfway_is_radius_30() {
        let p = phase(PhaseKind::BreatheIn, 4000);
        match evaluate(Some(&p), 2000, true) {
            RenderState::Circle { radius, label } => {
                assert_eq!(radius, 30.0);
                assert_eq!(label, Some("Breath In"));
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn breathe_out_shrinks() {
        let p = phase(PhaseKind::BreatheOut, 4000);
        let RenderState::Circle { radius: early, .. } = evaluate(Some(&p), 1000, true) else {
            panic!("expected circle");
        };
        let RenderState::Circle { radius: late, .. } = evaluate(Some(&p), 3000, true) else {
            panic!("expected circle");
        };
        assert!(late < early);
        assert_eq!(evaluate(Some(&p), 0, true), RenderState::Circle {
            radius: MAX_RADIUS,
            label: Some("Breath Out"),
        });
    }

    #[test]
    fn progress_clamps_past_duration() {
        assert_eq!(progress(4000, 9000), 1.0);
        assert_eq!(progress(4000, 0), 0.0);
        let p = phase(PhaseKind::BreatheIn, 4000);
        match evaluate(Some(&p), 9000, true) {
            RenderState::Circle { radius, .. } => assert_eq!(radius, MAX_RADIUS),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn breathe_labels_hidden_when_stopped() {
        let p = phase(PhaseKind::BreatheIn, 4000);
        match evaluate(Some(&p), 2000, false) {
            RenderState::Circle { label, .. } => assert_eq!(label, None),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn hold_empty_sweeps_at_min_radius() {
        let p = phase(PhaseKind::HoldEmpty, 4000);
        match evaluate(Some(&p), 1000, true) {
            RenderState::Arc {
                radius,
                start_deg,
                end_deg,
                label,
            } => {
                assert_eq!(radius, MIN_RADIUS);
                assert_eq!(start_deg, 90.0);
                assert_eq!(end_deg, 360.0);
                assert_eq!(label, "Hold Empty Breath");
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn hold_full_label_shown_while_stopped() {
        let p = phase(PhaseKind::HoldFull, 4000);
        match evaluate(Some(&p), 0, false) {
            RenderState::Arc { radius, label, .. } => {
                assert_eq!(radius, MAX_RADIUS);
                assert_eq!(label, "Hold Full Breath");
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn no_phase_renders_empty() {
        assert_eq!(evaluate(None, 500, true), RenderState::Empty);
    }
}
