//! # Breather Core Library
//!
//! Core logic for Breather, a timed breathing-exercise sequencer.
//! All behavior lives here; the CLI binary is a thin layer that wires
//! the sequencer to real timers and a terminal renderer. A GUI front
//! end would wire the same capabilities to window chrome and buttons.
//!
//! ## Architecture
//!
//! - **Sequencer**: a heartbeat-driven state machine that owns the
//!   phase list and cursor. The caller invokes `tick()` once per
//!   second and `frame()` once per animation frame; timers, haptics
//!   and session closure are injected capabilities
//! - **Progress Model**: pure functions mapping phase state to a
//!   circle radius or arc sweep plus a label, evaluated every frame
//! - **Config**: TOML-based user settings (auto-start, auto-terminate,
//!   colors, frame rate, custom sequences)
//!
//! ## Key Components
//!
//! - [`Sequencer`]: core session state machine
//! - [`Sequence`]: ordered phase list with cursor
//! - [`render::evaluate`]: progress model
//! - [`Drivers`]: capability traits for timers, haptics, and the host
//! - [`Config`]: application configuration management

pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod render;
pub mod sequencer;

pub use config::{Config, PhaseSpec};
pub use drivers::{Drivers, Haptics, SessionHost, TickTimer};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use render::{RenderState, MAX_RADIUS, MIN_RADIUS};
pub use sequencer::{Phase, PhaseKind, Sequence, Sequencer, SessionState, PHASE_CUE_MS, TICK_MS};
