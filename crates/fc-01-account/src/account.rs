//! # Account
//!
//! A facilitator-controlled address on one chain.

use crate::domain::AccountError;
use crate::nonce::NonceManager;
use crate::ports::{KeyVault, NonceSource};
use shared_types::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Facilitator account with its nonce counter.
pub struct Account {
    address: Address,
    vault: Arc<dyn KeyVault>,
    nonces: NonceManager,
    unlocked: AtomicBool,
}

impl Account {
    /// Creates a locked account.
    pub fn new(address: Address, vault: Arc<dyn KeyVault>, nonce_source: Arc<dyn NonceSource>) -> Self {
        Self {
            address,
            vault,
            nonces: NonceManager::new(address, nonce_source),
            unlocked: AtomicBool::new(false),
        }
    }

    /// Account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Unlocks the account. Never errors: a wrong password or an unreachable
    /// keystore both yield `false`.
    pub async fn unlock(&self, password: &str) -> bool {
        let unlocked = match self.vault.unlock(self.address, password).await {
            Ok(unlocked) => unlocked,
            Err(e) => {
                warn!(address = ?self.address, error = %e, "Keystore unlock failed");
                false
            }
        };
        if unlocked {
            info!(address = ?self.address, "Account unlocked");
        }
        self.unlocked.store(unlocked, Ordering::SeqCst);
        unlocked
    }

    /// Whether [`Account::unlock`] last succeeded.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Allocates the next transaction nonce.
    pub async fn next_nonce(&self) -> Result<u64, AccountError> {
        self.nonces.next_nonce().await
    }
}
