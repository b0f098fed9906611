use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note cannot be empty")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Invalid color '{0}', expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("{0}")]
    Load(String),
    #[error("No user configured. Pass --user or set NOTESYNC_USER.")]
    MissingUser,
}
