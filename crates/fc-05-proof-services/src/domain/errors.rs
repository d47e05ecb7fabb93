//! # Domain Errors

use fc_01_account::AccountError;
use fc_02_storage::StorageError;
use shared_bus::ObserverError;
use shared_types::{Address, ChainId, Hash};
use thiserror::Error;

/// Failure of one reaction cycle. The next trigger re-derives the work.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The auxiliary chain row was never seeded.
    #[error("auxiliary chain {0} not found")]
    MissingAuxiliaryChain(ChainId),

    /// A gateway row was never seeded.
    #[error("gateway {0:?} not found")]
    GatewayNotFound(Address),

    /// Persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The proof generator failed or returned an incomplete proof.
    #[error("proof generation failed: {0}")]
    Proof(String),

    /// Submitting the transaction failed.
    #[error(transparent)]
    Submission(#[from] AccountError),

    /// An accept receipt without the declared-intent log.
    #[error("receipt {0:?} carries no declared intent")]
    MissingMessageHash(Hash),
}

impl ServiceError {
    /// Wraps the error for the subject's failure log.
    pub fn into_observer_error(self, observer: &str) -> ObserverError {
        ObserverError::new(observer, self)
    }
}
