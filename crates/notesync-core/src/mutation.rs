//! Mutation coordinator: validated writes with optimistic status feedback.
//!
//! Writes never touch the local note list. They go to the gateway and come
//! back through the sync engine's subscription; only the status channel
//! changes optimistically.

use std::sync::Arc;

use tokio::time::Instant;

use crate::clock::{Clock, TimestampIssuer};
use crate::config::EngineConfig;
use crate::gateway::NotesGateway;
use crate::models::{LanguageCode, Note, NoteDraft, NoteId};
use crate::session::{SessionContext, UserId};
use crate::state::StatusChannel;
use crate::translate::Translator;
use crate::util::is_blank;
use crate::{Error, Result};

const EMPTY_NOTE_MESSAGE: &str = "Note cannot be empty";
const EMPTY_ID_MESSAGE: &str = "Note ID cannot be empty";
const SAVE_FAILED_MESSAGE: &str = "Failed to save note";
const DELETE_FAILED_MESSAGE: &str = "Failed to delete note";

/// A deleted note that can still be restored until `expires_at`.
///
/// Consumed by [`MutationCoordinator::undo`], so a deletion is compensated
/// at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndo {
    note: Note,
    expires_at: Instant,
}

impl PendingUndo {
    /// The note as it was before deletion.
    #[must_use]
    pub const fn note(&self) -> &Note {
        &self.note
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct MutationCoordinator {
    gateway: Arc<dyn NotesGateway>,
    translator: Arc<dyn Translator>,
    session: SessionContext,
    status: StatusChannel,
    clock: Arc<dyn Clock>,
    timestamps: TimestampIssuer,
    config: EngineConfig,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn NotesGateway>,
        translator: Arc<dyn Translator>,
        session: SessionContext,
        status: StatusChannel,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            gateway,
            translator,
            session,
            status,
            clock,
            timestamps: TimestampIssuer::default(),
            config,
        }
    }

    /// Save a draft: `add` when it carries no id, `replace` otherwise.
    ///
    /// Returns the id the note was written under.
    pub async fn create_or_update(&self, draft: NoteDraft) -> Result<NoteId> {
        if draft.is_empty() {
            self.status.error(EMPTY_NOTE_MESSAGE);
            return Err(Error::Validation(EMPTY_NOTE_MESSAGE.to_string()));
        }

        let timestamp = self.next_timestamp();
        let note = draft.into_note(timestamp, &self.config.default_title);
        self.save(note).await
    }

    /// Delete the note stored under `id`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let Ok(id) = id.parse::<NoteId>() else {
            self.status.error(EMPTY_ID_MESSAGE);
            return Err(Error::Validation(EMPTY_ID_MESSAGE.to_string()));
        };

        let user = self.require_user()?;
        self.status.loading();
        match self.gateway.delete(&user, &id).await {
            Ok(()) => {
                tracing::debug!("Deleted note {}", id);
                self.status
                    .succeed("Deleted", self.config.success_reset_delay());
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to delete note {}: {}", id, error);
                self.status.error(error.status_message(DELETE_FAILED_MESSAGE));
                Err(error)
            }
        }
    }

    /// Flip `pinned`, keeping every other field. The timestamp is refreshed,
    /// so the note moves within its pinned group as well.
    pub async fn toggle_pin(&self, note: &Note) -> Result<NoteId> {
        let draft = NoteDraft::from_note(note).with_pinned(!note.pinned);
        self.create_or_update(draft).await
    }

    /// Translate the note's content into `target` and write the replacement.
    ///
    /// A missing user is published as an error status like every other
    /// operation; translation and write failures are reported only through the
    /// returned result.
    pub async fn translate(&self, note: &Note, target: LanguageCode) -> Result<()> {
        let Some(id) = note.id.clone() else {
            return Err(Error::Validation(EMPTY_ID_MESSAGE.to_string()));
        };
        let user = self.require_user()?;

        let translated = self
            .translator
            .translate(&note.content, target)
            .await
            .filter(|text| !is_blank(text));
        let Some(translated) = translated else {
            tracing::warn!("Translation of note {} to {} failed", id, target);
            return Err(Error::TranslationFailed);
        };

        let replacement = note
            .clone()
            .with_translation(translated, target)
            .with_timestamp(self.next_timestamp());
        self.gateway
            .replace(&user, &id, replacement)
            .await
            .inspect_err(|error| {
                tracing::warn!("Failed to store translation of note {}: {}", id, error);
            })?;
        tracing::debug!("Translated note {} to {}", id, target);
        Ok(())
    }

    /// Delete `note` and hand back a token that can restore it within the
    /// configured undo window.
    pub async fn delete_with_undo(&self, note: &Note) -> Result<PendingUndo> {
        let id = note.id.as_ref().map(ToString::to_string).unwrap_or_default();
        self.delete(&id).await?;
        Ok(PendingUndo {
            note: note.clone(),
            expires_at: Instant::now() + self.config.undo_window(),
        })
    }

    /// Restore a deleted note with its previous field values, timestamp
    /// included. The gateway assigns a new id.
    ///
    /// This is the one write that does not take a fresh timestamp: keeping the
    /// old one puts the note back in its previous list position.
    pub async fn undo(&self, pending: PendingUndo) -> Result<NoteId> {
        if pending.is_expired() {
            tracing::debug!("Undo requested after window closed");
            return Err(Error::UndoExpired);
        }

        let restored = Note {
            id: None,
            ..pending.note
        };
        self.save(restored).await
    }

    async fn save(&self, note: Note) -> Result<NoteId> {
        let user = self.require_user()?;
        self.status.loading();

        let result = match note.id.clone() {
            Some(id) => self
                .gateway
                .replace(&user, &id, note)
                .await
                .map(|()| id),
            None => self.gateway.add(&user, note).await,
        };

        match result {
            Ok(id) => {
                tracing::debug!("Saved note {}", id);
                self.status
                    .succeed("Saved", self.config.success_reset_delay());
                Ok(id)
            }
            Err(error) => {
                tracing::warn!("Failed to save note: {}", error);
                self.status.error(error.status_message(SAVE_FAILED_MESSAGE));
                Err(error)
            }
        }
    }

    fn require_user(&self) -> Result<UserId> {
        self.session
            .require_user()
            .map(|user| user.id.clone())
            .inspect_err(|error| self.status.error(error.to_string()))
    }

    fn next_timestamp(&self) -> i64 {
        self.timestamps.next(self.clock.as_ref())
    }
}
