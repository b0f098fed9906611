use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use notesync_core::export::ExportFormat as CoreExportFormat;
use notesync_core::LanguageCode;

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Manage your synced notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the local note store
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// User the notes belong to
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Email shown for the signed-in user
    #[arg(long, global = true, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Path to an engine config file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(short, long, default_value = "")]
        title: String,
        /// Background color as #RRGGBB or #AARRGGBB
        #[arg(long, value_name = "HEX")]
        color: Option<String>,
        /// Language of the note content
        #[arg(long, value_name = "CODE")]
        language: Option<LanguageCode>,
        /// Pin the note
        #[arg(long)]
        pinned: bool,
        /// Note content
        content: Vec<String>,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// Replacement title
        #[arg(short, long)]
        title: Option<String>,
        /// Replacement content (opens $EDITOR when no field is given)
        #[arg(short, long)]
        content: Option<String>,
        /// Replacement color as #RRGGBB or #AARRGGBB
        #[arg(long, value_name = "HEX")]
        color: Option<String>,
        /// Replacement language
        #[arg(long, value_name = "CODE")]
        language: Option<LanguageCode>,
    },
    /// List notes, pinned first
    List {
        /// Only notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only pinned notes
        #[arg(long)]
        pinned: bool,
        /// Number of notes to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pin or unpin a note
    Pin {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Export all notes
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List supported note languages
    Languages,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Json,
}

impl From<ExportFormat> for CoreExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Text => Self::Text,
            ExportFormat::Json => Self::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

impl CompletionShell {
    pub const ALL: [Self; 5] = [
        Self::Bash,
        Self::Zsh,
        Self::Fish,
        Self::PowerShell,
        Self::Elvish,
    ];
}
