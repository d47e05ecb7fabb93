//! # Confirm Intent Service
//!
//! Reacts to the target gateway's proven height. Every message the
//! facilitator accepted that is declared at or below that height gets a
//! storage proof of its outbox entry and a `confirmStakeIntent` /
//! `confirmRedeemIntent` on the target gateway.

use super::inflight::InFlight;
use crate::domain::{outbox_storage_key, ReactOutcome, ServiceError};
use crate::ports::ProofGenerator;
use async_trait::async_trait;
use facilitator_telemetry::metrics::PROOFS_REQUESTED;
use fc_01_account::{BridgeCall, ConfirmIntentArgs, ContractCall, TransactionSubmitter};
use fc_02_storage::{Gateway, Message, MessageDirection, MessageType, Repositories, Request};
use shared_bus::{Observer, ObserverError};
use shared_types::{Address, BlockHeight, Hash, U256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confirms accepted intents on the target chain of one direction.
pub struct ConfirmIntentService {
    name: String,
    direction: MessageDirection,
    repositories: Arc<Repositories>,
    proofs: Arc<dyn ProofGenerator>,
    submitter: Arc<TransactionSubmitter>,
    inflight: InFlight<Hash>,
    cycle: tokio::sync::Mutex<()>,
}

impl ConfirmIntentService {
    /// `proofs` must serve the source chain and `submitter` the target chain
    /// of `direction`.
    pub fn new(
        direction: MessageDirection,
        repositories: Arc<Repositories>,
        proofs: Arc<dyn ProofGenerator>,
        submitter: Arc<TransactionSubmitter>,
    ) -> Self {
        Self {
            name: format!("confirm-intent({direction})"),
            direction,
            repositories,
            proofs,
            submitter,
            inflight: InFlight::default(),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Messages submitted for and not yet confirmed.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Confirms every accepted message the proof at `height` on
    /// `target_gateway` covers.
    pub async fn react_to(
        &self,
        target_gateway: Address,
        height: BlockHeight,
    ) -> Result<ReactOutcome, ServiceError> {
        let _cycle = self.cycle.lock().await;
        let repos = &self.repositories;

        let target = repos
            .gateways
            .get(target_gateway)
            .await?
            .ok_or(ServiceError::GatewayNotFound(target_gateway))?;
        let source = target.remote_gateway_address;

        let pending = repos
            .messages
            .pending_confirmation(source, self.direction, height)
            .await?;
        let live: HashSet<Hash> = pending.iter().map(|m| m.message_hash).collect();
        self.inflight.retain(|hash| live.contains(hash));

        let mut transaction_hashes = Vec::new();
        let mut failure = None;
        for message in pending {
            let Some(hash_lock) = message.hash_lock else {
                debug!(message_hash = ?message.message_hash, "No hash lock known, not ours to confirm");
                continue;
            };
            let Some(request) = repos.requests.find_by_message_hash(&message.message_hash).await?
            else {
                debug!(message_hash = ?message.message_hash, "No linked request, not ours to confirm");
                continue;
            };
            if !self.inflight.try_claim(&message.message_hash) {
                continue;
            }

            match self
                .confirm(&message, &request, hash_lock, target_gateway, source, height)
                .await
            {
                Ok(tx_hash) => transaction_hashes.push(tx_hash),
                Err(e) => {
                    self.inflight.release(&message.message_hash);
                    warn!(message_hash = ?message.message_hash, height, error = %e, "Confirmation failed");
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(ReactOutcome::from_hashes(transaction_hashes)),
        }
    }

    async fn confirm(
        &self,
        message: &Message,
        request: &Request,
        hash_lock: Hash,
        target_gateway: Address,
        source_gateway: Address,
        height: BlockHeight,
    ) -> Result<Hash, ServiceError> {
        let key = outbox_storage_key(&message.message_hash);
        PROOFS_REQUESTED.inc();
        let proof = self
            .proofs
            .get_outbox_proof(source_gateway, &[key], height)
            .await?;
        let storage_proof = proof
            .storage_proofs
            .into_iter()
            .find(|p| p.key == key)
            .ok_or_else(|| ServiceError::Proof(format!("no storage proof for {key:?}")))?;

        let args = ConfirmIntentArgs {
            sender: message.sender,
            sender_nonce: message.nonce,
            beneficiary: request.beneficiary,
            amount: request.amount,
            gas_price: message.gas_price,
            gas_limit: message.gas_limit,
            hash_lock,
            block_height: height,
            storage_proof: storage_proof.serialized_proof,
        };
        let call = match message.message_type {
            MessageType::Stake => BridgeCall::ConfirmStakeIntent(args),
            MessageType::Redeem => BridgeCall::ConfirmRedeemIntent(args),
        };
        let receipt = self
            .submitter
            .submit(ContractCall::new(target_gateway, call), U256::zero())
            .await?;
        info!(
            message_hash = ?message.message_hash,
            height,
            tx_hash = ?receipt.transaction_hash,
            "Intent confirmed"
        );
        Ok(receipt.transaction_hash)
    }
}

#[async_trait]
impl Observer<Gateway> for ConfirmIntentService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&self, updates: &[Gateway]) -> Result<(), ObserverError> {
        let mut failure = None;
        for gateway in updates
            .iter()
            .filter(|g| g.gateway_type.side() == self.direction.target())
        {
            let Some(height) = gateway.last_remote_gateway_proven_block_height else {
                continue;
            };
            if let Err(e) = self.react_to(gateway.gateway_address, height).await {
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => Err(e.into_observer_error(&self.name)),
            None => Ok(()),
        }
    }
}
