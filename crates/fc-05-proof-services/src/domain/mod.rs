//! # Domain Module

pub mod errors;
pub mod proof;

pub use errors::ServiceError;
pub use proof::{outbox_storage_key, ProofData, ReactOutcome, StorageProof, MESSAGE_OUTBOX_SLOT};
