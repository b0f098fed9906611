use notesync_core::models::NoteDraft;
use notesync_core::LanguageCode;

use crate::commands::common::{
    capture_editor_input_with_initial, open_session, parse_color, resolve_note_content, CliContext,
};
use crate::error::CliError;

pub async fn run_add(
    context: &CliContext,
    title: &str,
    content_parts: &[String],
    color: Option<&str>,
    language: Option<LanguageCode>,
    pinned: bool,
) -> Result<(), CliError> {
    let mut content = resolve_note_content(content_parts)?;
    if content.is_none() && title.trim().is_empty() {
        content = capture_editor_input_with_initial("")?;
    }
    let Some(content) = content.or_else(|| (!title.trim().is_empty()).then(String::new)) else {
        return Err(CliError::EmptyContent);
    };

    let mut draft = NoteDraft::new(title.trim(), content).with_pinned(pinned);
    if let Some(color) = color {
        draft = draft.with_color(parse_color(color)?);
    }
    if let Some(language) = language {
        draft = draft.with_language(language);
    }

    let session = open_session(context).await?;
    let id = session.create_or_update(draft).await?;

    println!("{id}");
    Ok(())
}
