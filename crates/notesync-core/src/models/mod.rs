//! Data models for NoteSync

mod language;
mod note;

pub use language::LanguageCode;
pub use note::{sort_notes, Note, NoteDraft, NoteId, DEFAULT_NOTE_COLOR};
