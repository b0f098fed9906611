//! Note export renderers shared by every client.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::Note;

const TEXT_EXPORT_HEADER: &str = "NoteSync Export File (TXT)";
const TEXT_EXPORT_SEPARATOR: &str = "---------------------------";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// Serializable note representation used in JSON exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub color: String,
    pub pinned: bool,
    pub timestamp: i64,
    pub language_code: String,
}

#[must_use]
pub fn note_to_export_item(note: &Note) -> ExportNote {
    ExportNote {
        id: note.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        title: note.title.clone(),
        content: note.content.clone(),
        color: format!("#{:08X}", note.color),
        pinned: note.pinned,
        timestamp: note.timestamp,
        language_code: note.language_code.code().to_string(),
    }
}

/// Render notes as pretty-printed JSON.
pub fn render_json_export(notes: &[Note]) -> serde_json::Result<String> {
    let items = notes
        .iter()
        .map(note_to_export_item)
        .collect::<Vec<ExportNote>>();
    serde_json::to_string_pretty(&items)
}

/// Render notes as a readable plain-text document.
#[must_use]
pub fn render_text_export(notes: &[Note]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{TEXT_EXPORT_HEADER}");
    let _ = writeln!(output);

    for note in notes {
        let _ = writeln!(output, "Title: {}", note.title);
        let _ = writeln!(output, "Content: {}", note.content);
        let _ = writeln!(output, "Language: {}", note.language_code);
        let _ = writeln!(output, "Pinned: {}", note.pinned);
        let _ = writeln!(output, "{TEXT_EXPORT_SEPARATOR}");
        let _ = writeln!(output);
    }

    output
}

/// Render notes based on selected export format.
pub fn render_notes_export(notes: &[Note], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Text => Ok(render_text_export(notes)),
        ExportFormat::Json => render_json_export(notes),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("notesync-export-{timestamp_ms}.{}", format.extension())
}
