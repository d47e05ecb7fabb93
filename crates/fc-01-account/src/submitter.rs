//! # Transaction Submitter
//!
//! Sends bridge calls from an unlocked facilitator account.

use crate::account::Account;
use crate::domain::{AccountError, ContractCall, TransactionReceipt, TxOptions};
use crate::ports::ChainClient;
use facilitator_telemetry::metrics::TRANSACTIONS_SUBMITTED;
use shared_types::{ChainSide, U256};
use std::sync::Arc;
use tracing::{info, warn};

/// Gas settings applied to every facilitator transaction on one chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasSettings {
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: U256,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            gas_price: U256::from(1_000_000_000u64),
            gas_limit: U256::from(7_000_000u64),
        }
    }
}

/// Submits calls on one chain side.
pub struct TransactionSubmitter {
    side: ChainSide,
    account: Arc<Account>,
    client: Arc<dyn ChainClient>,
    gas: GasSettings,
}

impl TransactionSubmitter {
    /// Creates a submitter for `account` on `side`.
    pub fn new(
        side: ChainSide,
        account: Arc<Account>,
        client: Arc<dyn ChainClient>,
        gas: GasSettings,
    ) -> Self {
        Self {
            side,
            account,
            client,
            gas,
        }
    }

    /// Chain side the submitter sends to.
    pub fn side(&self) -> ChainSide {
        self.side
    }

    /// The sending account.
    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    /// Sends `call` carrying `value` wei and waits for a successful receipt.
    ///
    /// A failure after the nonce was allocated leaves a nonce gap; it is
    /// logged and not repaired here.
    pub async fn submit(
        &self,
        call: ContractCall,
        value: U256,
    ) -> Result<TransactionReceipt, AccountError> {
        let method = call.call.name();
        if !self.account.is_unlocked() {
            TRANSACTIONS_SUBMITTED.with_label_values(&[method, "locked"]).inc();
            return Err(AccountError::Locked(self.account.address()));
        }

        let nonce = self.account.next_nonce().await?;
        let options = TxOptions {
            from: self.account.address(),
            gas_price: self.gas.gas_price,
            gas: self.gas.gas_limit,
            nonce,
            value,
        };

        match self.client.send_transaction(&call, &options).await {
            Ok(receipt) if receipt.status => {
                TRANSACTIONS_SUBMITTED.with_label_values(&[method, "mined"]).inc();
                info!(
                    side = %self.side,
                    method,
                    to = ?call.to,
                    nonce,
                    tx_hash = ?receipt.transaction_hash,
                    "Transaction mined"
                );
                Ok(receipt)
            }
            Ok(receipt) => {
                TRANSACTIONS_SUBMITTED.with_label_values(&[method, "reverted"]).inc();
                warn!(side = %self.side, method, nonce, tx_hash = ?receipt.transaction_hash, "Transaction reverted");
                Err(AccountError::Reverted(receipt.transaction_hash))
            }
            Err(e) => {
                TRANSACTIONS_SUBMITTED.with_label_values(&[method, "failed"]).inc();
                warn!(
                    side = %self.side,
                    method,
                    nonce,
                    error = %e,
                    "Send failed after nonce allocation; later sends may stall until the gap is filled"
                );
                Err(e)
            }
        }
    }
}
