use crate::commands::common::{open_session, resolve_note, CliContext};
use crate::error::CliError;

pub async fn run_pin(context: &CliContext, id: &str) -> Result<(), CliError> {
    let session = open_session(context).await?;
    let note = resolve_note(id, &session.notes())?;

    let id = session.toggle_pin(&note).await?;
    let state = if note.pinned { "unpinned" } else { "pinned" };
    println!("{id} {state}");
    Ok(())
}
