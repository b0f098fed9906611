//! Realtime sync engine.
//!
//! Owns the single subscription to a user's note collection and republishes
//! every snapshot as a canonically sorted, immutable note list.
//!
//! ```text
//! start_listening ─► Syncing ─(snapshot)─► Synced ─(error)─► Error
//!        ▲                                                     │
//!        └──────────── stop_listening ─► Offline ◄─────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::gateway::{NotesGateway, SnapshotEvent, Subscription};
use crate::models::{sort_notes, Note};
use crate::session::SessionContext;
use crate::state::{StatusChannel, SyncState};
use crate::util::is_blank;
use crate::Result;

/// Published note list. Each snapshot produces a new value; published lists
/// are never mutated.
pub type NoteList = Arc<Vec<Note>>;

const LOAD_FAILED_MESSAGE: &str = "Failed to load notes";

/// Subscription owner for one session.
pub struct SyncEngine {
    gateway: Arc<dyn NotesGateway>,
    session: SessionContext,
    status: StatusChannel,
    notes: Arc<watch::Sender<NoteList>>,
    sync_state: Arc<watch::Sender<SyncState>>,
    listener: Arc<Mutex<ListenerSlot>>,
}

/// Active listener task plus the generation it was started under. Events are
/// only applied while their generation is still current.
#[derive(Debug, Default)]
struct ListenerSlot {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn NotesGateway>,
        session: SessionContext,
        status: StatusChannel,
    ) -> Self {
        let (notes, _) = watch::channel(NoteList::default());
        let (sync_state, _) = watch::channel(SyncState::Offline);
        Self {
            gateway,
            session,
            status,
            notes: Arc::new(notes),
            sync_state: Arc::new(sync_state),
            listener: Arc::new(Mutex::new(ListenerSlot::default())),
        }
    }

    /// (Re)start the subscription for the session's user.
    ///
    /// Any previous subscription is stopped first. Returns as soon as the
    /// listener is registered; snapshots are applied by a background task, so
    /// this must be called from within a tokio runtime.
    pub fn start_listening(&self) -> Result<()> {
        self.stop_listening();

        let user = match self.session.require_user() {
            Ok(user) => user.id.clone(),
            Err(error) => {
                tracing::warn!("Cannot listen for notes: {}", error);
                self.status.error(error.to_string());
                return Err(error);
            }
        };

        let subscription = match self.gateway.subscribe(&user) {
            Ok(subscription) => subscription,
            Err(error) => {
                tracing::warn!("Failed to subscribe to notes for {}: {}", user, error);
                self.status.error(error.status_message(LOAD_FAILED_MESSAGE));
                self.sync_state.send_replace(SyncState::Error);
                return Err(error);
            }
        };

        let mut slot = lock_slot(&self.listener);
        slot.generation += 1;
        self.sync_state.send_replace(SyncState::Syncing);
        let listener = Listener {
            generation: slot.generation,
            slot: Arc::clone(&self.listener),
            notes: Arc::clone(&self.notes),
            sync_state: Arc::clone(&self.sync_state),
            status: self.status.clone(),
        };
        slot.task = Some(tokio::spawn(listener.run(subscription)));
        tracing::info!("Listening for notes of user {}", user);
        Ok(())
    }

    /// Cancel the active subscription. A no-op when nothing is listening.
    pub fn stop_listening(&self) {
        let mut slot = lock_slot(&self.listener);
        slot.generation += 1;
        if let Some(task) = slot.task.take() {
            task.abort();
            self.sync_state.send_replace(SyncState::Offline);
            tracing::info!("Stopped listening for notes");
        }
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        lock_slot(&self.listener).task.is_some()
    }

    /// Latest published list (empty until the first snapshot).
    #[must_use]
    pub fn notes(&self) -> NoteList {
        self.notes.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_notes(&self) -> watch::Receiver<NoteList> {
        self.notes.subscribe()
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        *self.sync_state.borrow()
    }

    #[must_use]
    pub fn subscribe_sync_state(&self) -> watch::Receiver<SyncState> {
        self.sync_state.subscribe()
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

struct Listener {
    generation: u64,
    slot: Arc<Mutex<ListenerSlot>>,
    notes: Arc<watch::Sender<NoteList>>,
    sync_state: Arc<watch::Sender<SyncState>>,
    status: StatusChannel,
}

impl Listener {
    async fn run(self, mut subscription: Subscription) {
        while let Some(event) = subscription.next().await {
            let slot = lock_slot(&self.slot);
            if slot.generation != self.generation {
                break;
            }

            match event {
                SnapshotEvent::Snapshot(mut notes) => {
                    sort_notes(&mut notes);
                    tracing::debug!("Applied snapshot with {} notes", notes.len());
                    self.notes.send_replace(Arc::new(notes));
                    self.sync_state.send_replace(SyncState::Synced);
                }
                SnapshotEvent::Error(reason) => {
                    tracing::warn!("Notes subscription failed: {}", reason);
                    let message = if is_blank(&reason) {
                        LOAD_FAILED_MESSAGE.to_string()
                    } else {
                        reason
                    };
                    self.status.error(message);
                    self.sync_state.send_replace(SyncState::Error);
                }
            }
        }
        tracing::debug!("Notes subscription closed");
    }
}

fn lock_slot(slot: &Mutex<ListenerSlot>) -> MutexGuard<'_, ListenerSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
