use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use notesync_core::gateway::LocalNotesGateway;
use notesync_core::{
    AuthUser, EngineConfig, Note, NotesSession, OperationStatus, SessionContext, SyncState,
    UserId,
};
use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

/// Resolved store, identity and engine settings for one invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub store_path: PathBuf,
    pub user: UserId,
    pub email: Option<String>,
    pub config: EngineConfig,
}

impl CliContext {
    pub fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let store_path = resolve_store_path(cli.store.clone());
        let user = resolve_user(cli.user.clone())?;
        let email = cli
            .email
            .clone()
            .or_else(|| env::var("NOTESYNC_EMAIL").ok());
        let config_path = resolve_config_path(cli.config.clone());
        let config = EngineConfig::load_from_path(&config_path)?;

        Ok(Self {
            store_path,
            user,
            email,
            config,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub pinned: bool,
    pub language: String,
    pub timestamp: i64,
    pub relative_time: String,
}

/// Open a session on the local store and wait for its first snapshot.
pub async fn open_session(context: &CliContext) -> Result<NotesSession, CliError> {
    let gateway = LocalNotesGateway::open(&context.store_path)?;
    let user = AuthUser::new(context.user.clone(), context.email.clone());
    let session = NotesSession::builder(Arc::new(gateway), SessionContext::signed_in(user))
        .config(context.config.clone())
        .build();

    session.start_listening()?;
    match session.wait_until_loaded().await {
        SyncState::Synced => Ok(session),
        state => {
            tracing::warn!("Notes did not load (state {:?})", state);
            let reason = match session.status() {
                OperationStatus::Error(message) => message,
                _ => "Failed to load notes".to_string(),
            };
            Err(CliError::Load(reason))
        }
    }
}

/// Find a note by full id or unique id prefix.
pub fn resolve_note(note_query: &str, notes: &[Note]) -> Result<Note, CliError> {
    let query = normalize_note_identifier(note_query)?;

    if let Some(note) = notes.iter().find(|note| note_id(note) == query) {
        return Ok(note.clone());
    }

    let matching = notes
        .iter()
        .filter(|note| note_id(note).starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(note))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn note_id(note: &Note) -> String {
    note.id.as_ref().map(ToString::to_string).unwrap_or_default()
}

pub fn short_id(note: &Note) -> String {
    note_id(note).chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let marker = if note.pinned { "*" } else { " " };
            let title = truncate(&note.title, 24);
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.timestamp, now_ms);
            format!(
                "{:<13} {marker} {title:<24}  {preview:<40}  {relative_time}",
                short_id(note)
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note_id(note),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        pinned: note.pinned,
        language: note.language_code.code().to_string(),
        timestamp: note.timestamp,
        relative_time: format_relative_time(note.timestamp, now_ms),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB`.
pub fn parse_color(raw: &str) -> Result<u32, CliError> {
    let hex = raw.trim().trim_start_matches('#');
    let invalid = || CliError::InvalidColor(raw.to_string());
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    match (hex.len(), u32::from_str_radix(hex, 16)) {
        (6, Ok(value)) => Ok(0xFF00_0000 | value),
        (8, Ok(value)) => Ok(value),
        _ => Err(invalid()),
    }
}

/// Content from arguments, then piped stdin.
pub fn resolve_note_content(content_parts: &[String]) -> Result<Option<String>, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(Some(content));
    }
    read_piped_stdin()
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program).args(parts).arg(file_path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("notesync-note-{}-{now}.txt", std::process::id()))
}

pub fn resolve_store_path(cli_store: Option<PathBuf>) -> PathBuf {
    cli_store
        .or_else(|| env::var_os("NOTESYNC_STORE").map(PathBuf::from))
        .unwrap_or_else(default_store_path)
}

pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("notesync")
        .join("notes.json")
}

pub fn resolve_config_path(cli_config: Option<PathBuf>) -> PathBuf {
    cli_config
        .or_else(|| env::var_os("NOTESYNC_CONFIG").map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("notesync")
        .join("config.json")
}

pub fn resolve_user(cli_user: Option<String>) -> Result<UserId, CliError> {
    let candidates = [
        cli_user,
        env::var("NOTESYNC_USER").ok(),
        env::var("USER").ok(),
        env::var("USERNAME").ok(),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| candidate.parse::<UserId>().ok())
        .ok_or(CliError::MissingUser)
}
