use fc_02_storage::{EntityKind, StorageError};
use thiserror::Error;

/// Failure of one handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A record of another kind was routed to this handler.
    #[error("{handler} cannot handle {kind} records")]
    UnexpectedEvent {
        /// Receiving handler.
        handler: &'static str,
        /// Kind of the offending record.
        kind: EntityKind,
    },

    /// Static metadata the handler depends on was never seeded.
    #[error("missing metadata: {0}")]
    MissingMetadata(String),
}

/// Failure of a dispatch cycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler registered for a kind present in the batch.
    #[error("no handler registered for {0}")]
    HandlerNotFound(EntityKind),

    /// A handler failed. Other kinds of the same batch may have been applied.
    #[error("handler for {kind} failed: {source}")]
    Handler {
        /// Kind whose handler failed.
        kind: EntityKind,
        /// Cause.
        #[source]
        source: HandlerError,
    },

    /// The dispatch loop is gone.
    #[error("dispatch loop closed")]
    Closed,
}
