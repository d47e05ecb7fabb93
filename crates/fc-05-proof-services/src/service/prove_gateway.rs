//! # Prove Gateway Service
//!
//! Reacts to newly anchored state roots. When messages are declared on the
//! source chain at or below the anchored height and still unconfirmed, the
//! source gateway's account is proven on the target gateway at that height.
//!
//! One instance per direction:
//!
//! | Direction | Anchored height | Proven gateway | Submitted on |
//! |-----------|-----------------|----------------|--------------|
//! | origin → auxiliary | `last_origin_block_height` | origin gateway | co-gateway |
//! | auxiliary → origin | `last_auxiliary_block_height` | co-gateway | origin gateway |

use crate::domain::{ReactOutcome, ServiceError};
use crate::ports::ProofGenerator;
use async_trait::async_trait;
use facilitator_telemetry::metrics::PROOFS_REQUESTED;
use fc_01_account::{BridgeCall, ContractCall, TransactionSubmitter};
use fc_02_storage::{AuxiliaryChain, MessageDirection, Repositories};
use parking_lot::Mutex;
use shared_bus::{Observer, ObserverError};
use shared_types::{Address, BlockHeight, ChainId, Hash, U256};
use std::sync::Arc;
use tracing::{debug, info};

/// Proves the source gateway on the target gateway.
pub struct ProveGatewayService {
    name: String,
    auxiliary_chain_id: ChainId,
    direction: MessageDirection,
    repositories: Arc<Repositories>,
    proofs: Arc<dyn ProofGenerator>,
    submitter: Arc<TransactionSubmitter>,
    last_proven: Mutex<Option<(BlockHeight, Vec<Hash>)>>,
    cycle: tokio::sync::Mutex<()>,
}

impl ProveGatewayService {
    /// `proofs` must serve the source chain and `submitter` the target chain
    /// of `direction`.
    pub fn new(
        auxiliary_chain_id: ChainId,
        direction: MessageDirection,
        repositories: Arc<Repositories>,
        proofs: Arc<dyn ProofGenerator>,
        submitter: Arc<TransactionSubmitter>,
    ) -> Self {
        Self {
            name: format!("prove-gateway({direction})"),
            auxiliary_chain_id,
            direction,
            repositories,
            proofs,
            submitter,
            last_proven: Mutex::new(None),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Direction this instance serves.
    pub fn direction(&self) -> MessageDirection {
        self.direction
    }

    /// (source gateway, target gateway) of `chain` for this direction.
    fn gateway_pair(&self, chain: &AuxiliaryChain) -> (Address, Address) {
        match self.direction {
            MessageDirection::OriginToAuxiliary => {
                (chain.origin_gateway_address, chain.auxiliary_gateway_address)
            }
            MessageDirection::AuxiliaryToOrigin => {
                (chain.auxiliary_gateway_address, chain.origin_gateway_address)
            }
        }
    }

    fn anchored_height(&self, chain: &AuxiliaryChain) -> Option<BlockHeight> {
        match self.direction {
            MessageDirection::OriginToAuxiliary => chain.last_origin_block_height,
            MessageDirection::AuxiliaryToOrigin => chain.last_auxiliary_block_height,
        }
    }

    /// Proves the source gateway at `height` if any message needs it.
    ///
    /// Running it twice for the same height and pending set submits once.
    pub async fn react_to(&self, height: BlockHeight) -> Result<ReactOutcome, ServiceError> {
        let _cycle = self.cycle.lock().await;
        let repos = &self.repositories;

        let chain = repos
            .auxiliary_chains
            .get(self.auxiliary_chain_id)
            .await?
            .ok_or(ServiceError::MissingAuxiliaryChain(self.auxiliary_chain_id))?;
        let (source, target) = self.gateway_pair(&chain);
        let source_gateway = repos
            .gateways
            .get(source)
            .await?
            .ok_or(ServiceError::GatewayNotFound(source))?;

        let proven = repos
            .gateways
            .get(target)
            .await?
            .and_then(|gateway| gateway.last_remote_gateway_proven_block_height);
        if proven.is_some_and(|proven| proven >= height) {
            debug!(direction = %self.direction, height, "Target already proven at this height");
            return Ok(ReactOutcome::AlreadyProven { height });
        }

        let pending: Vec<Hash> = repos
            .messages
            .pending_confirmation(source_gateway.gateway_address, self.direction, height)
            .await?
            .into_iter()
            .map(|message| message.message_hash)
            .collect();
        if pending.is_empty() {
            return Ok(ReactOutcome::NothingPending);
        }
        if matches!(&*self.last_proven.lock(), Some((h, set)) if *h == height && *set == pending) {
            debug!(direction = %self.direction, height, "Height already proven for this pending set");
            return Ok(ReactOutcome::AlreadyProven { height });
        }

        PROOFS_REQUESTED.inc();
        let proof = self.proofs.get_outbox_proof(source, &[], height).await?;
        let call = ContractCall::new(
            target,
            BridgeCall::ProveGateway {
                block_height: height,
                encoded_account: proof.encoded_account_value,
                account_proof: proof.serialized_account_proof,
            },
        );
        let receipt = self.submitter.submit(call, U256::zero()).await?;
        info!(
            direction = %self.direction,
            height,
            pending = pending.len(),
            tx_hash = ?receipt.transaction_hash,
            "Gateway proven"
        );

        *self.last_proven.lock() = Some((height, pending));
        Ok(ReactOutcome::Submitted {
            transaction_hashes: vec![receipt.transaction_hash],
        })
    }
}

#[async_trait]
impl Observer<AuxiliaryChain> for ProveGatewayService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&self, updates: &[AuxiliaryChain]) -> Result<(), ObserverError> {
        let height = updates
            .iter()
            .filter(|chain| chain.chain_id == self.auxiliary_chain_id)
            .filter_map(|chain| self.anchored_height(chain))
            .max();
        let Some(height) = height else {
            return Ok(());
        };

        let outcome = self
            .react_to(height)
            .await
            .map_err(|e| e.into_observer_error(&self.name))?;
        debug!(direction = %self.direction, height, ?outcome, "Anchored height handled");
        Ok(())
    }
}
