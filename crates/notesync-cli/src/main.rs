//! NoteSync CLI - manage synced notes from the terminal.

mod cli;
mod commands;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::CliContext;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, NoteEdits};
use crate::commands::export::run_export;
use crate::commands::languages::run_languages;
use crate::commands::list::run_list;
use crate::commands::pin::run_pin;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "notesync=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that never touch the store.
    match &cli.command {
        Commands::Languages => {
            run_languages();
            return Ok(());
        }
        Commands::Completions { shell, output } => {
            return run_completions(*shell, output.as_deref());
        }
        _ => {}
    }

    let context = CliContext::resolve(&cli)?;
    tracing::debug!(
        "Using store {} for user {}",
        context.store_path.display(),
        context.user
    );

    match cli.command {
        Commands::Add {
            title,
            color,
            language,
            pinned,
            content,
        } => {
            run_add(&context, &title, &content, color.as_deref(), language, pinned).await?;
        }
        Commands::Edit {
            id,
            title,
            content,
            color,
            language,
        } => {
            let edits = NoteEdits {
                title,
                content,
                color,
                language,
            };
            run_edit(&context, &id, edits).await?;
        }
        Commands::List {
            search,
            pinned,
            limit,
            json,
        } => run_list(&context, search.as_deref(), pinned, limit, json).await?,
        Commands::Pin { id } => run_pin(&context, &id).await?,
        Commands::Delete { id } => run_delete(&context, &id).await?,
        Commands::Export { format, output } => {
            run_export(&context, format.into(), output.as_deref()).await?;
        }
        Commands::Languages | Commands::Completions { .. } => {}
    }

    Ok(())
}
