//! Note model

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::LanguageCode;
use crate::util::is_blank;
use crate::Error;

/// Opaque ARGB white, used when no color was picked.
pub const DEFAULT_NOTE_COLOR: u32 = 0xFFFF_FFFF;

/// Identifier of a persisted note. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh, time-sortable identifier (UUID v7)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err(Error::Validation("Note ID cannot be empty".to_string()))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl TryFrom<String> for NoteId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteId> for String {
    fn from(value: NoteId) -> Self {
        value.0
    }
}

/// A note record as stored in a user's collection.
///
/// Notes are immutable values: every mutation builds a complete replacement
/// through one of the `with_*` constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Absent until the gateway has persisted the note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Packed ARGB presentation color
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default)]
    pub pinned: bool,
    /// Last write time (Unix ms)
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub language_code: LanguageCode,
}

const fn default_color() -> u32 {
    DEFAULT_NOTE_COLOR
}

impl Note {
    #[must_use]
    pub fn with_id(self, id: NoteId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    #[must_use]
    pub fn with_pinned(self, pinned: bool) -> Self {
        Self { pinned, ..self }
    }

    #[must_use]
    pub fn with_timestamp(self, timestamp: i64) -> Self {
        Self { timestamp, ..self }
    }

    /// Replacement carrying translated content in `language`.
    #[must_use]
    pub fn with_translation(self, content: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            content: content.into(),
            language_code: language,
            ..self
        }
    }

    /// Canonical list order: pinned first, then newest first.
    #[must_use]
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .pinned
            .cmp(&self.pinned)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
    }
}

/// Sort notes in canonical display order. The sort is stable, so notes that
/// tie on both keys keep their incoming relative order.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(Note::display_order);
}

/// User-entered note fields for a create-or-update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    /// Blank or absent means "create"
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub color: u32,
    pub language: LanguageCode,
    pub pinned: bool,
}

impl NoteDraft {
    /// Draft for a brand-new note.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            color: DEFAULT_NOTE_COLOR,
            language: LanguageCode::default(),
            pinned: false,
        }
    }

    /// Draft carrying every field of an existing note.
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.as_ref().map(ToString::to_string),
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            language: note.language_code,
            pinned: note.pinned,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub const fn with_language(mut self, language: LanguageCode) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub const fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Whether both title and content are blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_blank(&self.title) && is_blank(&self.content)
    }

    /// Target id, if the draft addresses an existing note.
    pub fn target_id(&self) -> Option<NoteId> {
        self.id.as_deref().and_then(|id| id.parse().ok())
    }

    /// Build the record to write, substituting `default_title` for a blank
    /// title.
    #[must_use]
    pub fn into_note(self, timestamp: i64, default_title: &str) -> Note {
        let id = self.target_id();
        let title = if is_blank(&self.title) {
            default_title.to_string()
        } else {
            self.title
        };
        Note {
            id,
            title,
            content: self.content,
            color: self.color,
            pinned: self.pinned,
            timestamp,
            language_code: self.language,
        }
    }
}
