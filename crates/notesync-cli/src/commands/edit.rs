use notesync_core::models::NoteDraft;
use notesync_core::LanguageCode;

use crate::commands::common::{
    capture_editor_input_with_initial, open_session, parse_color, resolve_note, CliContext,
};
use crate::error::CliError;

/// Field replacements requested on the command line.
#[derive(Debug, Default)]
pub struct NoteEdits {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub language: Option<LanguageCode>,
}

impl NoteEdits {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.color.is_none()
            && self.language.is_none()
    }

    pub fn apply(self, mut draft: NoteDraft) -> Result<NoteDraft, CliError> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(color) = self.color {
            draft.color = parse_color(&color)?;
        }
        if let Some(language) = self.language {
            draft.language = language;
        }
        Ok(draft)
    }
}

pub async fn run_edit(context: &CliContext, id: &str, edits: NoteEdits) -> Result<(), CliError> {
    let session = open_session(context).await?;
    let note = resolve_note(id, &session.notes())?;

    let edits = if edits.is_empty() {
        let Some(content) = capture_editor_input_with_initial(&note.content)? else {
            return Err(CliError::EmptyContent);
        };
        NoteEdits {
            content: Some(content),
            ..NoteEdits::default()
        }
    } else {
        edits
    };

    let draft = edits.apply(NoteDraft::from_note(&note))?;
    let id = session.create_or_update(draft).await?;

    println!("{id}");
    Ok(())
}
