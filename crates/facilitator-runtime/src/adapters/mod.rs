//! # Adapters
//!
//! Port implementations for the real chain nodes and storage.
//!
//! - `json_rpc` - account ports over an Ethereum JSON-RPC node
//! - `proof` - gateway proofs over `eth_getProof`
//! - `storage` - key/value store selection (memory, RocksDB)

pub mod json_rpc;
pub mod proof;
pub mod storage;

pub use json_rpc::{JsonRpcChainClient, JsonRpcClient, RpcError};
pub use proof::JsonRpcProofGenerator;
pub use storage::{open_store, OpenStoreError};
