//! Process-local realtime gateway with optional JSON persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{NotesGateway, SnapshotEvent, Subscription};
use crate::models::{Note, NoteId};
use crate::session::UserId;
use crate::{Error, Result};

const STORE_FILE_VERSION: u32 = 1;

/// Gateway keeping every user's collection in process memory.
///
/// Behaves like the remote store: each subscription receives the current
/// snapshot on registration and again after every write to that user's
/// collection, ordered by timestamp ascending. When opened with a path, every
/// write is persisted before it is acknowledged.
#[derive(Debug, Default)]
pub struct LocalNotesGateway {
    state: Mutex<LocalState>,
    store_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct LocalState {
    collections: BTreeMap<UserId, Vec<Note>>,
    listeners: HashMap<UserId, Vec<mpsc::UnboundedSender<SnapshotEvent>>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    users: BTreeMap<UserId, Vec<Note>>,
}

impl LocalNotesGateway {
    /// Gateway without persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Gateway persisted at `path`; loads existing contents when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let collections = if path.exists() {
            load_store_file(&path)?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(
            "Opened local note store at {} ({} users)",
            path.display(),
            collections.len()
        );

        Ok(Self {
            state: Mutex::new(LocalState {
                collections,
                listeners: HashMap::new(),
            }),
            store_path: Some(path),
        })
    }

    /// Deliver a subscription failure to every listener of `user`.
    pub fn broadcast_error(&self, user: &UserId, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.lock();
        if let Some(listeners) = state.listeners.get_mut(user) {
            listeners.retain(|listener| listener.send(SnapshotEvent::Error(reason.clone())).is_ok());
        }
    }

    /// Number of live subscriptions for `user`.
    pub fn listener_count(&self, user: &UserId) -> usize {
        let mut state = self.lock();
        state.listeners.get_mut(user).map_or(0, |listeners| {
            listeners.retain(|listener| !listener.is_closed());
            listeners.len()
        })
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the user's collection, persist, then commit
    /// and notify listeners. Nothing is committed when persistence fails.
    ///
    /// Persistence is blocking `std::fs` I/O performed under the state lock,
    /// which keeps file order equal to commit order. Sized for a CLI-scale
    /// store; a long-lived session with large collections stalls its runtime
    /// worker for the duration of each rewrite.
    fn write<T>(&self, user: &UserId, change: impl FnOnce(&mut Vec<Note>) -> T) -> Result<T> {
        let mut state = self.lock();
        let mut collection = state.collections.get(user).cloned().unwrap_or_default();
        let outcome = change(&mut collection);

        if let Some(path) = &self.store_path {
            let mut users = state.collections.clone();
            users.insert(user.clone(), collection.clone());
            save_store_file(path, users).map_err(|error| {
                tracing::warn!("Failed to persist note store at {}: {}", path.display(), error);
                Error::Gateway(format!("Failed to persist notes: {error}"))
            })?;
        }

        state.collections.insert(user.clone(), collection);
        notify(&mut state, user);
        Ok(outcome)
    }
}

#[async_trait]
impl NotesGateway for LocalNotesGateway {
    fn subscribe(&self, user: &UserId) -> Result<Subscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let snapshot = snapshot_of(&state, user);
        // A fresh channel cannot be closed yet.
        let _ = sender.send(SnapshotEvent::Snapshot(snapshot));
        state.listeners.entry(user.clone()).or_default().push(sender);
        Ok(Subscription::new(receiver))
    }

    async fn add(&self, user: &UserId, note: Note) -> Result<NoteId> {
        let id = NoteId::generate();
        let stored = note.with_id(id.clone());
        self.write(user, |notes| notes.push(stored))?;
        tracing::debug!("Added note {} for user {}", id, user);
        Ok(id)
    }

    async fn replace(&self, user: &UserId, id: &NoteId, note: Note) -> Result<()> {
        let stored = note.with_id(id.clone());
        self.write(user, |notes| {
            match notes.iter_mut().find(|existing| existing.id.as_ref() == Some(id)) {
                Some(existing) => *existing = stored,
                None => notes.push(stored),
            }
        })?;
        tracing::debug!("Replaced note {} for user {}", id, user);
        Ok(())
    }

    async fn delete(&self, user: &UserId, id: &NoteId) -> Result<()> {
        self.write(user, |notes| {
            notes.retain(|existing| existing.id.as_ref() != Some(id));
        })?;
        tracing::debug!("Deleted note {} for user {}", id, user);
        Ok(())
    }
}

fn snapshot_of(state: &LocalState, user: &UserId) -> Vec<Note> {
    let mut notes = state.collections.get(user).cloned().unwrap_or_default();
    notes.sort_by_key(|note| note.timestamp);
    notes
}

fn notify(state: &mut LocalState, user: &UserId) {
    let snapshot = snapshot_of(state, user);
    if let Some(listeners) = state.listeners.get_mut(user) {
        listeners
            .retain(|listener| listener.send(SnapshotEvent::Snapshot(snapshot.clone())).is_ok());
    }
}

fn load_store_file(path: &Path) -> Result<BTreeMap<UserId, Vec<Note>>> {
    let raw = std::fs::read_to_string(path)?;
    let file: StoreFile = serde_json::from_str(&raw)?;
    if file.version != STORE_FILE_VERSION {
        return Err(Error::Config(format!(
            "unsupported note store version {} (expected {})",
            file.version, STORE_FILE_VERSION
        )));
    }
    Ok(file.users)
}

fn save_store_file(path: &Path, users: BTreeMap<UserId, Vec<Note>>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = StoreFile {
        version: STORE_FILE_VERSION,
        users,
    };
    std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}
