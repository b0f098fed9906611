//! Signed-in user context and the per-session notes facade.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::gateway::NotesGateway;
use crate::models::{LanguageCode, Note, NoteDraft, NoteId};
use crate::mutation::{MutationCoordinator, PendingUndo};
use crate::projection::{ProjectionFilter, ViewProjection};
use crate::state::{OperationStatus, StatusChannel, SyncState};
use crate::sync::{NoteList, SyncEngine};
use crate::translate::{Translator, UnavailableTranslator};
use crate::{Error, Result};

/// Identifier of an authenticated user. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err(Error::Validation("User ID cannot be empty".to_string()))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

impl AuthUser {
    #[must_use]
    pub const fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Who the engine acts for. Passed explicitly to every component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<AuthUser>,
}

impl SessionContext {
    #[must_use]
    pub const fn signed_in(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&AuthUser> {
        self.user.as_ref().ok_or(Error::Unauthenticated)
    }

    /// Signed-in email, or an empty string.
    #[must_use]
    pub fn email(&self) -> String {
        self.user
            .as_ref()
            .and_then(|user| user.email.clone())
            .unwrap_or_default()
    }
}

/// One user's notes screen state: synced list, filtered view, status and
/// mutations, all sharing one status channel.
///
/// Dropping the session stops listening.
pub struct NotesSession {
    session: SessionContext,
    status: StatusChannel,
    engine: SyncEngine,
    projection: ViewProjection,
    coordinator: MutationCoordinator,
}

pub struct NotesSessionBuilder {
    gateway: Arc<dyn NotesGateway>,
    session: SessionContext,
    translator: Arc<dyn Translator>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl NotesSessionBuilder {
    #[must_use]
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Assemble the session. Must run inside a tokio runtime.
    #[must_use]
    pub fn build(self) -> NotesSession {
        let status = StatusChannel::new();
        let engine = SyncEngine::new(
            Arc::clone(&self.gateway),
            self.session.clone(),
            status.clone(),
        );
        let projection = ViewProjection::new(engine.subscribe_notes());
        let coordinator = MutationCoordinator::new(
            self.gateway,
            self.translator,
            self.session.clone(),
            status.clone(),
            self.clock,
            self.config,
        );

        NotesSession {
            session: self.session,
            status,
            engine,
            projection,
            coordinator,
        }
    }
}

impl NotesSession {
    #[must_use]
    pub fn builder(gateway: Arc<dyn NotesGateway>, session: SessionContext) -> NotesSessionBuilder {
        NotesSessionBuilder {
            gateway,
            session,
            translator: Arc::new(UnavailableTranslator),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn start_listening(&self) -> Result<()> {
        self.engine.start_listening()
    }

    pub fn stop_listening(&self) {
        self.engine.stop_listening();
    }

    /// Wait until the first snapshot has been applied or the subscription
    /// failed, returning the resulting state.
    pub async fn wait_until_loaded(&self) -> SyncState {
        let mut receiver = self.engine.subscribe_sync_state();
        let outcome = receiver
            .wait_for(|state| {
                matches!(
                    state,
                    SyncState::Synced | SyncState::Error | SyncState::Offline
                )
            })
            .await
            .map(|state| *state);
        outcome.unwrap_or(SyncState::Offline)
    }

    #[must_use]
    pub fn notes(&self) -> NoteList {
        self.engine.notes()
    }

    #[must_use]
    pub fn subscribe_notes(&self) -> watch::Receiver<NoteList> {
        self.engine.subscribe_notes()
    }

    #[must_use]
    pub fn filtered_notes(&self) -> Vec<Note> {
        self.projection.current()
    }

    #[must_use]
    pub fn subscribe_filtered_notes(&self) -> watch::Receiver<NoteList> {
        self.projection.subscribe()
    }

    pub fn update_search(&self, text: impl Into<String>) {
        self.projection.set_search(text);
    }

    pub fn set_pinned_only(&self, pinned_only: bool) {
        self.projection.set_pinned_only(pinned_only);
    }

    #[must_use]
    pub fn search_text(&self) -> String {
        self.projection.search()
    }

    #[must_use]
    pub fn pinned_only(&self) -> bool {
        self.projection.pinned_only()
    }

    #[must_use]
    pub fn filter(&self) -> ProjectionFilter {
        self.projection.filter()
    }

    #[must_use]
    pub fn status(&self) -> OperationStatus {
        self.status.current()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<OperationStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.engine.sync_state()
    }

    #[must_use]
    pub fn user_email(&self) -> String {
        self.session.email()
    }

    pub async fn create_or_update(&self, draft: NoteDraft) -> Result<NoteId> {
        self.coordinator.create_or_update(draft).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.coordinator.delete(id).await
    }

    pub async fn toggle_pin(&self, note: &Note) -> Result<NoteId> {
        self.coordinator.toggle_pin(note).await
    }

    pub async fn translate(&self, note: &Note, target: LanguageCode) -> Result<()> {
        self.coordinator.translate(note, target).await
    }

    pub async fn delete_with_undo(&self, note: &Note) -> Result<PendingUndo> {
        self.coordinator.delete_with_undo(note).await
    }

    pub async fn undo(&self, pending: PendingUndo) -> Result<NoteId> {
        self.coordinator.undo(pending).await
    }
}
