//! # FC-01 Account
//!
//! Facilitator-controlled accounts on both chains.
//!
//! ## Purpose
//!
//! - Unlock the facilitator account with its keystore password
//! - Allocate transaction nonces locally after one chain query
//! - Encode typed bridge contract calls and submit them
//!
//! ## Nonce Allocation
//!
//! | Call | Source |
//! |------|--------|
//! | first `next_nonce()` | pending-inclusive transaction count from the chain |
//! | later calls | cached value + 1 |
//!
//! The cache lives in memory only. A restart re-queries the chain, and a send
//! that fails after a nonce was allocated leaves a gap that stalls later
//! transactions from the same account until it is filled.
//!
//! ## Module Structure
//!
//! ```text
//! fc-01-account/
//! ├── domain/          # BridgeCall, TxOptions, receipts, errors
//! ├── abi              # sol! bindings of the bridge contracts
//! ├── ports/           # NonceSource, KeyVault, ChainClient (+ mock)
//! ├── nonce            # NonceManager
//! ├── account          # Account
//! └── submitter        # TransactionSubmitter
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod account;
pub mod domain;
pub mod nonce;
pub mod ports;
pub mod submitter;

pub use account::Account;
pub use abi::{DeclaredIntent, RedeemIntentDeclared, StakeIntentDeclared};
pub use domain::{
    AcceptRequestArgs, AccountError, BridgeCall, ConfirmIntentArgs, ContractCall, LogEntry,
    ProgressArgs, TransactionReceipt, TxOptions,
};
pub use nonce::NonceManager;
pub use ports::{ChainClient, KeyVault, MockChainClient, NonceSource};
pub use submitter::{GasSettings, TransactionSubmitter};
