use fc_02_storage::{EntityKind, StorageError};
use thiserror::Error;

/// Event index failures.
#[derive(Debug, Error)]
pub enum IndexError {
    /// HTTP or WebSocket transport failed.
    #[error("index transport error: {0}")]
    Transport(String),

    /// The index answered a page query with an error.
    #[error("query for {kind} failed: {reason}")]
    Query {
        /// Queried kind.
        kind: EntityKind,
        /// Reported cause.
        reason: String,
    },

    /// A raw record could not be decoded.
    #[error("cannot decode {kind} record {id}: {reason}")]
    Decode {
        /// Record kind.
        kind: EntityKind,
        /// Record id, `?` when not even the id was readable.
        id: String,
        /// Decoder message.
        reason: String,
    },

    /// Opening or running a live subscription failed.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// The dispatcher rejected or never acknowledged a batch.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// Cursor storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for IndexError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Subscription(e.to_string())
    }
}
