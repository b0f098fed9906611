use crate::commands::common::{note_id, open_session, resolve_note, CliContext};
use crate::error::CliError;

pub async fn run_delete(context: &CliContext, id: &str) -> Result<(), CliError> {
    let session = open_session(context).await?;
    let note = resolve_note(id, &session.notes())?;

    let id = note_id(&note);
    session.delete(&id).await?;
    println!("{id}");
    Ok(())
}
