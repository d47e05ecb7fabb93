//! # Keyed Locks
//!
//! Read-modify-write of one row must not interleave with another writer of
//! the same row. Keys are routed by hash to a fixed stripe of async mutexes;
//! two keys may share a stripe, one key always maps to the same stripe.
//!
//! Lock order: message stripe, then link stripe of (proxy, nonce), then
//! request stripe.

use shared_types::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default number of stripes per table.
pub const DEFAULT_STRIPES: usize = 64;

/// Striped async locks keyed by a 32-byte hash.
pub struct KeyedLocks {
    stripes: Vec<Arc<Mutex<()>>>,
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

impl KeyedLocks {
    /// Creates `stripes` locks (at least one).
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Arc::new(Mutex::new(()))).collect(),
        }
    }

    fn stripe(&self, key: &Hash) -> usize {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&key.as_bytes()[..8]);
        (u64::from_be_bytes(prefix) % self.stripes.len() as u64) as usize
    }

    /// Waits for and holds the stripe of `key` until the guard drops.
    pub async fn lock(&self, key: &Hash) -> OwnedMutexGuard<()> {
        self.stripes[self.stripe(key)].clone().lock_owned().await
    }
}
