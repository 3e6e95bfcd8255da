//! Typed errors for the note store and the note collection

use thiserror::Error;
use uuid::Uuid;

/// Failure of a single call against the remote record store.
///
/// The adapter never retries; the caller decides whether to surface the
/// error as a notification or to propagate it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No authenticated session")]
    Unauthenticated,

    #[error("Record store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Note not found: {0}")]
    NotFound(Uuid),
}

/// Errors surfaced by [`crate::notes::NoteCollection`] operations.
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No material is open")]
    Closed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, NoteError>;
