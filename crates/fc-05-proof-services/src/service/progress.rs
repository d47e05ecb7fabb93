//! # Progress Service
//!
//! Completes messages whose secret is known.
//!
//! | Step | When | Stake | Redeem |
//! |------|------|-------|--------|
//! | source | source Declared, target at least Declared | `progressStake` on gateway | `progressRedeem` on co-gateway |
//! | target | target Declared | `progressMint` on co-gateway | `progressUnstake` on gateway |

use super::inflight::InFlight;
use crate::domain::{ReactOutcome, ServiceError};
use async_trait::async_trait;
use fc_01_account::{BridgeCall, ContractCall, ProgressArgs, TransactionSubmitter};
use fc_02_storage::{Message, MessageStatus, MessageType, Repositories};
use shared_bus::{Observer, ObserverError};
use shared_types::{Address, ChainSide, Hash, U256};
use std::sync::Arc;
use tracing::{info, warn};

/// Side of a message a progress call completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressStep {
    /// Unlocks the staked or redeemed tokens on the source chain.
    Source,
    /// Mints or unstakes on the target chain.
    Target,
}

/// Submits progress calls on both chains.
pub struct ProgressService {
    repositories: Arc<Repositories>,
    origin: Arc<TransactionSubmitter>,
    auxiliary: Arc<TransactionSubmitter>,
    inflight: InFlight<(Hash, ProgressStep)>,
}

impl ProgressService {
    /// Creates the service over one submitter per chain.
    pub fn new(
        repositories: Arc<Repositories>,
        origin: Arc<TransactionSubmitter>,
        auxiliary: Arc<TransactionSubmitter>,
    ) -> Self {
        Self {
            repositories,
            origin,
            auxiliary,
            inflight: InFlight::default(),
        }
    }

    /// Steps of `message` that are due.
    pub fn due_steps(message: &Message) -> Vec<ProgressStep> {
        if message.secret.is_none() {
            return Vec::new();
        }
        let mut steps = Vec::with_capacity(2);
        if message.source_status == MessageStatus::Declared
            && message.target_status >= MessageStatus::Declared
        {
            steps.push(ProgressStep::Source);
        }
        if message.target_status == MessageStatus::Declared {
            steps.push(ProgressStep::Target);
        }
        steps
    }

    fn submitter(&self, side: ChainSide) -> &TransactionSubmitter {
        match side {
            ChainSide::Origin => &self.origin,
            ChainSide::Auxiliary => &self.auxiliary,
        }
    }

    /// Submits every due step of `message` not already in flight.
    pub async fn react_to_message(&self, message: &Message) -> Result<ReactOutcome, ServiceError> {
        if message.source_status == MessageStatus::Progressed {
            self.inflight.release(&(message.message_hash, ProgressStep::Source));
        }
        if message.target_status == MessageStatus::Progressed {
            self.inflight.release(&(message.message_hash, ProgressStep::Target));
        }

        let mut transaction_hashes = Vec::new();
        let mut failure = None;
        for step in Self::due_steps(message) {
            let key = (message.message_hash, step);
            if !self.inflight.try_claim(&key) {
                continue;
            }
            match self.progress(message, step).await {
                Ok(tx_hash) => transaction_hashes.push(tx_hash),
                Err(e) => {
                    self.inflight.release(&key);
                    warn!(message_hash = ?message.message_hash, ?step, error = %e, "Progress failed");
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(ReactOutcome::from_hashes(transaction_hashes)),
        }
    }

    async fn progress(&self, message: &Message, step: ProgressStep) -> Result<Hash, ServiceError> {
        let secret = message.secret.unwrap_or_default();
        let args = ProgressArgs {
            message_hash: message.message_hash,
            unlock_secret: secret,
        };

        let (side, contract, call) = match step {
            ProgressStep::Source => {
                let call = match message.message_type {
                    MessageType::Stake => BridgeCall::ProgressStake(args),
                    MessageType::Redeem => BridgeCall::ProgressRedeem(args),
                };
                (message.direction.source(), message.gateway_address, call)
            }
            ProgressStep::Target => {
                let call = match message.message_type {
                    MessageType::Stake => BridgeCall::ProgressMint(args),
                    MessageType::Redeem => BridgeCall::ProgressUnstake(args),
                };
                let remote = self.remote_gateway(message.gateway_address).await?;
                (message.direction.target(), remote, call)
            }
        };

        let receipt = self
            .submitter(side)
            .submit(ContractCall::new(contract, call), U256::zero())
            .await?;
        info!(
            message_hash = ?message.message_hash,
            ?step,
            tx_hash = ?receipt.transaction_hash,
            "Message progressed"
        );
        Ok(receipt.transaction_hash)
    }

    async fn remote_gateway(&self, gateway: Address) -> Result<Address, ServiceError> {
        self.repositories
            .gateways
            .get(gateway)
            .await?
            .map(|g| g.remote_gateway_address)
            .ok_or(ServiceError::GatewayNotFound(gateway))
    }
}

#[async_trait]
impl Observer<Message> for ProgressService {
    fn name(&self) -> &str {
        "progress"
    }

    async fn update(&self, updates: &[Message]) -> Result<(), ObserverError> {
        let mut failure = None;
        for message in updates {
            if let Err(e) = self.react_to_message(message).await {
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => Err(e.into_observer_error("progress")),
            None => Ok(()),
        }
    }
}
