//! # Nonce Manager
//!
//! Per-address nonce allocation.

use crate::domain::AccountError;
use crate::ports::NonceSource;
use shared_types::Address;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Hands out consecutive nonces for one address.
///
/// The first allocation asks the chain for the pending-inclusive transaction
/// count; every later allocation is the previous one plus one. Allocations are
/// serialized so concurrent callers never receive the same nonce.
pub struct NonceManager {
    address: Address,
    source: Arc<dyn NonceSource>,
    last_allocated: Mutex<Option<u64>>,
}

impl NonceManager {
    /// Creates a manager for `address` backed by `source`.
    pub fn new(address: Address, source: Arc<dyn NonceSource>) -> Self {
        Self {
            address,
            source,
            last_allocated: Mutex::new(None),
        }
    }

    /// Address this manager allocates for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Allocates the next nonce.
    ///
    /// A failed chain query leaves the cache empty so the next call retries
    /// the query.
    pub async fn next_nonce(&self) -> Result<u64, AccountError> {
        let mut last = self.last_allocated.lock().await;
        let next = match *last {
            Some(previous) => previous + 1,
            None => {
                let count = self.source.pending_transaction_count(self.address).await?;
                debug!(address = ?self.address, count, "Nonce seeded from chain");
                count
            }
        };
        *last = Some(next);
        Ok(next)
    }
}
