//! Live terminal session.
//!
//! A 1 Hz heartbeat drives the countdown, a configurable frame timer
//! drives the animation, and the terminal bell stands in for the
//! vibration motor. The whole loop runs on one thread; the sequencer
//! arms and cancels the two intervals through `Rc<Cell<bool>>` gates.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use clap::Args;

use breather_core::drivers::{Drivers, Haptics, SessionHost, TickTimer};
use breather_core::{Config, Event, RenderState, Sequencer, MAX_RADIUS, MIN_RADIUS};

#[derive(Args)]
pub struct RunArgs {
    /// Full passes through the sequence before exiting (ignored with
    /// auto-terminate, which always closes after the first pass)
    #[arg(long, default_value_t = 1)]
    pub cycles: u32,
    /// Close the session after one full pass (overrides config)
    #[arg(long)]
    pub auto_terminate: bool,
    /// Begin immediately even if auto-start is off in config
    #[arg(long)]
    pub auto_start: bool,
    /// Print events as JSON lines instead of drawing the animation
    #[arg(long)]
    pub json: bool,
}

/// Arm/cancel gate for one of the two interval timers. The tokio
/// interval keeps firing; a cleared gate makes the loop drop the tick,
/// which also makes cancel/arm trivially idempotent.
#[derive(Clone, Default)]
struct Gate(Rc<Cell<bool>>);

impl Gate {
    fn is_armed(&self) -> bool {
        self.0.get()
    }

    fn set(&self, armed: bool) {
        self.0.set(armed);
    }
}

struct GateTimer(Gate);

impl TickTimer for GateTimer {
    fn arm(&mut self) {
        self.0.set(true);
    }
    fn cancel(&mut self) {
        self.0.set(false);
    }
}

/// Terminal stand-in for the vibration motor and backlight.
struct TerminalHaptics {
    vibration: bool,
}

impl Haptics for TerminalHaptics {
    fn enqueue_cue(&mut self, pattern: &[u64]) {
        if self.vibration {
            let pulses: Vec<String> = pattern.iter().map(|ms| format!("{ms}")).collect();
            print!("\x07\r\x1b[K  * cue {} ms\n", pulses.join("/"));
            let _ = std::io::stdout().flush();
        }
    }
    fn set_light(&mut self, _on: bool) {}
}

struct TerminalHost {
    closed: Rc<Cell<bool>>,
}

impl SessionHost for TerminalHost {
    fn close_session(&mut self, _success: bool) {
        self.closed.set(true);
    }
    fn open_config(&mut self) {
        if let Ok(path) = Config::path() {
            println!("config: {}", path.display());
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let auto_terminate = args.auto_terminate || config.session.auto_terminate;
    let auto_start = args.auto_start || config.session.auto_start;
    let frame_ms = u64::from(1000 / config.ui.frame_rate.clamp(1, 60));
    let fg = ansi_color(&config.ui.foreground_color);

    let heartbeat_gate = Gate::default();
    let frame_gate = Gate::default();
    let closed = Rc::new(Cell::new(false));
    let drivers = Drivers {
        heartbeat: Box::new(GateTimer(heartbeat_gate.clone())),
        frame: Box::new(GateTimer(frame_gate.clone())),
        haptics: Box::new(TerminalHaptics {
            vibration: config.cues.vibration && !args.json,
        }),
        host: Box::new(TerminalHost {
            closed: closed.clone(),
        }),
    };
    let mut sequencer = Sequencer::with_drivers(config.seed_sequence()?, auto_terminate, drivers);

    if !auto_start {
        print!("press Enter to begin... ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let mut completed_cycles = 0u32;
    runtime.block_on(async {
        use tokio::time::{interval_at, Instant};

        if let Some(event) = sequencer.start() {
            emit(&event, args.json)?;
        }
        let mut heartbeat = interval_at(
            Instant::now() + Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let mut frames = interval_at(
            Instant::now() + Duration::from_millis(frame_ms),
            Duration::from_millis(frame_ms),
        );

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !heartbeat_gate.is_armed() {
                        continue;
                    }
                    if let Some(event) = sequencer.tick() {
                        emit(&event, args.json)?;
                        if let Event::SequenceCompleted { closed: false, .. } = event {
                            completed_cycles += 1;
                            if completed_cycles >= args.cycles.max(1) {
                                break;
                            }
                            if let Some(event) = sequencer.start() {
                                emit(&event, args.json)?;
                            }
                        }
                    }
                    if closed.get() {
                        completed_cycles += 1;
                        break;
                    }
                }
                _ = frames.tick() => {
                    if !frame_gate.is_armed() {
                        continue;
                    }
                    let state = sequencer.frame(frame_ms);
                    if !args.json {
                        draw(&state, &fg)?;
                    }
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    if !args.json {
        println!("\r\x1b[K");
        println!(
            "done: {completed_cycles} cycle{} completed",
            if completed_cycles == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn emit(event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

/// One animation line, redrawn in place. The circle radius maps to a
/// filled bar between the two extreme radii; the hold arc shows how
/// much of the sweep remains.
fn draw(state: &RenderState, fg: &str) -> Result<(), Box<dyn std::error::Error>> {
    const WIDTH: f64 = 40.0;
    let line = match state {
        RenderState::Empty => String::new(),
        RenderState::Circle { radius, label } => {
            let fill = ((radius - MIN_RADIUS) / (MAX_RADIUS - MIN_RADIUS) * WIDTH).round() as usize;
            format!(
                "{:<18} ({:>4.1}) {}{}",
                label.unwrap_or(""),
                radius,
                "o".repeat(fill),
                " ".repeat(WIDTH as usize - fill.min(WIDTH as usize)),
            )
        }
        RenderState::Arc {
            radius,
            start_deg,
            end_deg,
            label,
        } => {
            let fill = ((end_deg - start_deg) / 360.0 * WIDTH).round() as usize;
            format!(
                "{:<18} ({:>4.1}) {}{}",
                label,
                radius,
                "#".repeat(fill),
                ".".repeat(WIDTH as usize - fill.min(WIDTH as usize)),
            )
        }
    };
    print!("\r\x1b[K{fg}{line}\x1b[0m");
    std::io::stdout().flush()?;
    Ok(())
}

/// Truecolor escape for a `#rrggbb` string; empty when unparsable.
fn ansi_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return String::new();
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => format!("\x1b[38;2;{r};{g};{b}m"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_color_parses_hex() {
        assert_eq!(ansi_color("#ffffff"), "\x1b[38;2;255;255;255m");
        assert_eq!(ansi_color("000000"), "\x1b[38;2;0;0;0m");
        assert_eq!(ansi_color("#abc"), "");
        assert_eq!(ansi_color("#zzzzzz"), "");
    }

    #[test]
    fn gate_timer_is_idempotent() {
        let gate = Gate::default();
        let mut timer = GateTimer(gate.clone());
        timer.cancel();
        timer.cancel();
        assert!(!gate.is_armed());
        timer.arm();
        timer.arm();
        assert!(gate.is_armed());
    }
}
