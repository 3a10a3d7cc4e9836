//! Static shell completion generation

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::error::Result;

/// Generate completions for the given shell on stdout
pub fn run(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "vulnop", &mut std::io::stdout());
    Ok(())
}
