use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

const BIN_NAME: &str = "notesync";

/// Write the completion script to `output_path`, or stdout when absent.
pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);

    match output_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &script)?;
            tracing::info!("Wrote {:?} completions to {}", shell, path.display());
            println!("{}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }

    Ok(())
}

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    match shell {
        CompletionShell::Bash => render_with(shells::Bash),
        CompletionShell::Zsh => render_with(shells::Zsh),
        CompletionShell::Fish => render_with(shells::Fish),
        CompletionShell::PowerShell => render_with(shells::PowerShell),
        CompletionShell::Elvish => render_with(shells::Elvish),
    }
}

fn render_with<G: Generator>(generator: G) -> Vec<u8> {
    let mut command = Cli::command();
    let mut script = Vec::new();
    generate(generator, &mut command, BIN_NAME, &mut script);
    script
}
