//! notesync-core - Core library for NoteSync
//!
//! This crate contains the note model, the realtime sync engine, the filtered
//! view projection and the mutation coordinator shared by every NoteSync
//! client. The remote document store and the translation service are consumed
//! through the [`gateway::NotesGateway`] and [`translate::Translator`] traits.

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod mutation;
pub mod projection;
pub mod session;
pub mod state;
pub mod sync;
pub mod translate;
pub mod util;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use models::{LanguageCode, Note, NoteId};
pub use session::{AuthUser, NotesSession, SessionContext, UserId};
pub use state::{OperationStatus, SyncState};
