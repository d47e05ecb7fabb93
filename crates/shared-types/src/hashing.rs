//! Keccak-256 hashing.

use crate::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 digest of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    Hash::from_slice(&hasher.finalize())
}
