use clap::Subcommand;

use breather_core::Config;

#[derive(Subcommand)]
pub enum SequenceAction {
    /// Print the sequence a session would be seeded with
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SequenceAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let sequence = config.seed_sequence()?;

    match action {
        SequenceAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(sequence.phases())?);
            } else {
                for (index, phase) in sequence.phases().iter().enumerate() {
                    println!(
                        "{:>2}. {:<18} {:>5.1}s",
                        index + 1,
                        phase.kind.label(),
                        phase.duration_ms as f64 / 1000.0
                    );
                }
                println!(
                    "    total {:.1}s over {} phases",
                    sequence.total_duration_ms() as f64 / 1000.0,
                    sequence.len()
                );
            }
        }
    }
    Ok(())
}
