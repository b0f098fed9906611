//! Engine configuration.
//!
//! Timing and placeholder settings shared by every client. Values come from a
//! JSON file when present; every field falls back to its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;
use crate::{Error, Result};

const DEFAULT_SUCCESS_RESET_MS: u64 = 250;
/// Matches a "short" snackbar duration.
const DEFAULT_UNDO_WINDOW_MS: u64 = 4_000;
const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Delay before a Success status falls back to Idle
    #[serde(default = "default_success_reset_ms")]
    pub success_reset_ms: u64,
    /// How long a deleted note can still be restored
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
    /// Title given to notes saved with a blank title
    #[serde(default = "default_title")]
    pub default_title: String,
}

const fn default_success_reset_ms() -> u64 {
    DEFAULT_SUCCESS_RESET_MS
}

const fn default_undo_window_ms() -> u64 {
    DEFAULT_UNDO_WINDOW_MS
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            success_reset_ms: DEFAULT_SUCCESS_RESET_MS,
            undo_window_ms: DEFAULT_UNDO_WINDOW_MS,
            default_title: default_title(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn success_reset_delay(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }

    #[must_use]
    pub const fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    /// Parse and validate a JSON config payload.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
        config.validated()
    }

    /// Load config from `path`; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw).map_err(|error| match error {
            Error::Config(message) => {
                Error::Config(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    fn validated(mut self) -> Result<Self> {
        self.default_title = normalize_text_option(Some(self.default_title)).ok_or_else(|| {
            Error::Config("default_title must not be empty".to_string())
        })?;
        Ok(self)
    }
}
