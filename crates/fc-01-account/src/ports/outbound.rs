//! # Outbound Ports
//!
//! Traits for the chain node the facilitator account lives on.

use crate::abi::{sol_address, sol_hash, sol_uint, RedeemIntentDeclared, StakeIntentDeclared};
use crate::domain::{
    AccountError, BridgeCall, ContractCall, LogEntry, TransactionReceipt, TxOptions,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{keccak256, Address, Hash};
use std::collections::VecDeque;

/// Source of the pending-inclusive transaction count of an address.
#[async_trait]
pub trait NonceSource: Send + Sync {
    /// Transactions sent from `address`, including pending ones.
    async fn pending_transaction_count(&self, address: Address) -> Result<u64, AccountError>;
}

/// Keystore access on the node.
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Unlocks `address`. `Ok(false)` means the password was rejected.
    async fn unlock(&self, address: Address, password: &str) -> Result<bool, AccountError>;
}

/// Transaction submission.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Sends `call` with `options` and waits for its receipt.
    async fn send_transaction(
        &self,
        call: &ContractCall,
        options: &TxOptions,
    ) -> Result<TransactionReceipt, AccountError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Default)]
struct MockState {
    sent: Vec<(ContractCall, TxOptions)>,
    queued_logs: VecDeque<Vec<LogEntry>>,
    count_queries: usize,
}

/// In-memory chain node.
///
/// Accept calls get a declared-intent log whose message hash is the keccak of
/// the calldata unless logs were queued with [`MockChainClient::queue_logs`].
pub struct MockChainClient {
    /// Pending transaction count reported for every address.
    pub pending_count: u64,
    /// Password accepted by [`KeyVault::unlock`].
    pub password: String,
    /// Fail every send with an RPC error.
    pub fail_sends: bool,
    state: Mutex<MockState>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            pending_count: 0,
            password: "password".to_string(),
            fail_sends: false,
            state: Mutex::new(MockState::default()),
        }
    }
}

impl MockChainClient {
    /// Mock reporting `pending_count` for every address.
    pub fn with_pending_count(pending_count: u64) -> Self {
        Self {
            pending_count,
            ..Self::default()
        }
    }

    /// Fails every send from now on.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Logs attached to the next receipt.
    pub fn queue_logs(&self, logs: Vec<LogEntry>) {
        self.state.lock().queued_logs.push_back(logs);
    }

    /// Calls sent so far, in order.
    pub fn sent_calls(&self) -> Vec<ContractCall> {
        self.state.lock().sent.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Transaction options of every send, in order.
    pub fn sent_options(&self) -> Vec<TxOptions> {
        self.state.lock().sent.iter().map(|(_, o)| o.clone()).collect()
    }

    /// Number of sends.
    pub fn sent_count(&self) -> usize {
        self.state.lock().sent.len()
    }

    /// Number of nonce queries answered.
    pub fn count_queries(&self) -> usize {
        self.state.lock().count_queries
    }

    /// Message hash the mock declares for an accept call.
    pub fn declared_message_hash(call: &ContractCall) -> Hash {
        keccak256(call.call.encode())
    }

    fn default_logs(call: &ContractCall) -> Vec<LogEntry> {
        let message_hash = sol_hash(Self::declared_message_hash(call));
        let log = match &call.call {
            BridgeCall::AcceptStakeRequest(args) => LogEntry::from_event(
                args.gateway,
                &StakeIntentDeclared {
                    messageHash: message_hash,
                    staker: sol_address(args.sender),
                    stakerNonce: sol_uint(args.nonce),
                    beneficiary: sol_address(args.beneficiary),
                    amount: sol_uint(args.amount),
                },
            ),
            BridgeCall::AcceptRedeemRequest(args) => LogEntry::from_event(
                args.gateway,
                &RedeemIntentDeclared {
                    messageHash: message_hash,
                    redeemer: sol_address(args.sender),
                    redeemerNonce: sol_uint(args.nonce),
                    beneficiary: sol_address(args.beneficiary),
                    amount: sol_uint(args.amount),
                },
            ),
            _ => return Vec::new(),
        };
        vec![log]
    }
}

#[async_trait]
impl NonceSource for MockChainClient {
    async fn pending_transaction_count(&self, _address: Address) -> Result<u64, AccountError> {
        self.state.lock().count_queries += 1;
        Ok(self.pending_count)
    }
}

#[async_trait]
impl KeyVault for MockChainClient {
    async fn unlock(&self, _address: Address, password: &str) -> Result<bool, AccountError> {
        Ok(password == self.password)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn send_transaction(
        &self,
        call: &ContractCall,
        options: &TxOptions,
    ) -> Result<TransactionReceipt, AccountError> {
        if self.fail_sends {
            return Err(AccountError::Rpc("Mock failure".to_string()));
        }

        let mut state = self.state.lock();
        let logs = state
            .queued_logs
            .pop_front()
            .unwrap_or_else(|| Self::default_logs(call));
        state.sent.push((call.clone(), options.clone()));

        let mut preimage = call.call.encode();
        preimage.extend_from_slice(&options.nonce.to_be_bytes());
        preimage.extend_from_slice(options.from.as_bytes());

        Ok(TransactionReceipt {
            transaction_hash: keccak256(preimage),
            block_number: Some(state.sent.len() as u64),
            status: true,
            logs,
        })
    }
}
