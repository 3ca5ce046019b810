mod engine;
mod sequence;

pub use engine::{Sequencer, SessionState, PHASE_CUE_MS};
pub use sequence::{Phase, PhaseKind, Sequence, TICK_MS};
