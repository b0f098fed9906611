//! Shared state signals published to the presentation layer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

/// Sync state of a notes subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Not listening
    #[default]
    Offline,
    /// Listening, waiting for the first snapshot
    Syncing,
    /// At least one snapshot applied
    Synced,
    /// The subscription reported a failure; data may be stale
    Error,
}

/// Optimistic status of the most recent operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

impl OperationStatus {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Single status slot shared by the sync engine and mutation coordinator.
///
/// Last write wins. Each write bumps an epoch so a delayed Success→Idle reset
/// only fires if nothing was published after the Success it belongs to.
#[derive(Clone, Debug)]
pub struct StatusChannel {
    sender: Arc<watch::Sender<OperationStatus>>,
    epoch: Arc<Mutex<u64>>,
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusChannel {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(OperationStatus::Idle);
        Self {
            sender: Arc::new(sender),
            epoch: Arc::new(Mutex::new(0)),
        }
    }

    /// Current status value.
    #[must_use]
    pub fn current(&self) -> OperationStatus {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OperationStatus> {
        self.sender.subscribe()
    }

    pub fn loading(&self) {
        self.publish(OperationStatus::Loading);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(OperationStatus::Error(message.into()));
    }

    /// Publish `Success(message)` and schedule a reset to `Idle` after
    /// `reset_after`. Must be called from within a tokio runtime.
    pub fn succeed(&self, message: impl Into<String>, reset_after: Duration) {
        let epoch = self.publish(OperationStatus::Success(message.into()));
        let channel = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            channel.reset_if_unchanged(epoch);
        });
    }

    fn publish(&self, status: OperationStatus) -> u64 {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        *epoch += 1;
        self.sender.send_replace(status);
        *epoch
    }

    fn reset_if_unchanged(&self, expected_epoch: u64) {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if *epoch == expected_epoch {
            *epoch += 1;
            self.sender.send_replace(OperationStatus::Idle);
        }
    }
}
