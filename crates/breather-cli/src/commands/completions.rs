//! Shell completion script generation.

use clap_complete::Shell;

pub fn run(shell: Shell, mut cmd: clap::Command) -> Result<(), Box<dyn std::error::Error>> {
    clap_complete::generate(shell, &mut cmd, "breather-cli", &mut std::io::stdout());
    Ok(())
}
