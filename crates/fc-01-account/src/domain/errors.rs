//! # Domain Errors
//!
//! Error types for account handling and transaction submission.

use shared_types::{Address, Hash};
use thiserror::Error;

/// Account and submission errors.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    /// The account has not been unlocked.
    #[error("Account {0:?} is locked")]
    Locked(Address),

    /// Chain RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The transaction was mined but reverted.
    #[error("Transaction {0:?} reverted")]
    Reverted(Hash),

    /// No receipt appeared within the polling window.
    #[error("Transaction {0:?} not mined in time")]
    ReceiptTimeout(Hash),

    /// A chain response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}
