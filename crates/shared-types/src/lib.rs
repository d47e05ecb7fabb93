//! # Shared Types Crate
//!
//! Primitive types used across the facilitator crates.
//!
//! ## Design Principles
//!
//! - **One vocabulary**: addresses are `H160`, hashes are `H256`, token amounts
//!   and gas values are `U256`, block heights and index timestamps are `u64`.
//! - **Chain-native hashing**: every hash lock and selector is keccak-256.

pub mod chain;
pub mod errors;
pub mod hashing;
pub mod serde_helpers;

pub use chain::ChainSide;
pub use errors::ParseError;
pub use hashing::keccak256;
pub use primitive_types::{H160, H256, U256};

/// 20-byte account or contract address.
pub type Address = H160;

/// 32-byte keccak digest (message hash, request hash, hash lock, secret).
pub type Hash = H256;

/// Block height on either chain.
pub type BlockHeight = u64;

/// Chain identifier as configured for the bridge pair.
pub type ChainId = u64;
