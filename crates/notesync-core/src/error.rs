//! Error types for notesync-core

use thiserror::Error;

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Locally rejected input; never reaches the gateway
    #[error("{0}")]
    Validation(String),

    /// Gateway operation attempted without a signed-in user
    #[error("User must be logged in")]
    Unauthenticated,

    /// Failure reported by the remote note store
    #[error("{0}")]
    Gateway(String),

    /// Translation adapter returned nothing usable
    #[error("Translation failed")]
    TranslationFailed,

    /// Undo requested after its window closed
    #[error("Undo window has expired")]
    UndoExpired,

    /// Language code outside the supported set
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Message shown on the status channel, falling back to `fallback` when
    /// the underlying reason is blank.
    #[must_use]
    pub fn status_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}
