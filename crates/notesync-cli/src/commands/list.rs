use crate::commands::common::{
    format_note_lines, note_to_list_item, open_session, CliContext, NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(
    context: &CliContext,
    search: Option<&str>,
    pinned_only: bool,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let session = open_session(context).await?;
    if let Some(search) = search {
        session.update_search(search);
    }
    session.set_pinned_only(pinned_only);

    let notes = session
        .filtered_notes()
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>();

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
