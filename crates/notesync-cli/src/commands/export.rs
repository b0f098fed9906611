use std::path::{Path, PathBuf};

use chrono::Utc;
use notesync_core::export::{render_notes_export, suggested_export_file_name, ExportFormat};

use crate::commands::common::{open_session, CliContext};
use crate::error::CliError;

pub async fn run_export(
    context: &CliContext,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let session = open_session(context).await?;
    let notes = session.notes();
    let rendered = render_notes_export(&notes, format)?;

    if let Some(path) = output_path {
        let path = export_target(path, format, Utc::now().timestamp_millis());
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Directories receive a generated file name.
pub fn export_target(path: &Path, format: ExportFormat, timestamp_ms: i64) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(format, timestamp_ms))
    } else {
        path.to_path_buf()
    }
}
