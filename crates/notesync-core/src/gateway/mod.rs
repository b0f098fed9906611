//! Remote notes gateway boundary.
//!
//! The backing document store is consumed through [`NotesGateway`]: a realtime
//! per-user collection with subscribe/add/replace/delete. A subscription is a
//! stream of [`SnapshotEvent`]s; dropping the [`Subscription`] releases the
//! listener on the store side.

mod local;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::{Note, NoteId};
use crate::session::UserId;
use crate::Result;

pub use local::LocalNotesGateway;

/// One delivery from a realtime subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// Complete current contents of the collection
    Snapshot(Vec<Note>),
    /// The store reported a failure on this subscription
    Error(String),
}

/// Live subscription to a user's note collection.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SnapshotEvent>,
}

impl Subscription {
    #[must_use]
    pub const fn new(events: mpsc::UnboundedReceiver<SnapshotEvent>) -> Self {
        Self { events }
    }

    /// Next event, or `None` once the store has closed the subscription.
    pub async fn next(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }
}

/// Realtime note collection scoped to one user.
#[async_trait]
pub trait NotesGateway: Send + Sync {
    /// Open a realtime subscription. Returns once the listener is registered;
    /// snapshots arrive on the returned stream.
    fn subscribe(&self, user: &UserId) -> Result<Subscription>;

    /// Add a note; the store assigns and returns its id.
    async fn add(&self, user: &UserId, note: Note) -> Result<NoteId>;

    /// Replace the whole record stored under `id`.
    async fn replace(&self, user: &UserId, id: &NoteId, note: Note) -> Result<()>;

    /// Delete the record stored under `id`.
    async fn delete(&self, user: &UserId, id: &NoteId) -> Result<()>;
}
