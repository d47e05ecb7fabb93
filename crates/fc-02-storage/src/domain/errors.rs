//! # Domain Errors

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The underlying store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// A stored row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The entity failed validation; nothing was written.
    #[error("Invalid {entity} {key}: {reason}")]
    Validation {
        /// Entity type.
        entity: &'static str,
        /// Natural key of the rejected row.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn invalid(entity: &'static str, key: impl ToString, reason: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
