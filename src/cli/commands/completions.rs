//! Shell completions generation command.
//!
//! ```bash
//! recon completions bash > ~/.local/share/bash-completion/completions/recon
//! recon completions zsh -o ~/.zsh/completions/_recon
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::fs::File;
use std::io::{self, Write};
use tracing::info;

const BIN_NAME: &str = "recon";

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    let shell = convert_shell_type(args.shell);

    if let Some(output_path) = &args.output {
        let mut file = File::create(output_path)?;
        write_completions(shell, &mut file);
        file.flush()?;
        info!(path = %output_path.display(), ?shell, "Wrote completion script");
    } else {
        write_completions(shell, &mut io::stdout());
    }
    Ok(())
}

fn write_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}
