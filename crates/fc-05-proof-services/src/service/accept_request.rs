//! # Accept Request Service
//!
//! Turns stake / redeem requests into declared intents. The facilitator picks
//! a random secret, locks the message with its keccak and pays the gateway
//! bounty. The message hash comes back in the declared-intent log of the
//! receipt.

use super::inflight::InFlight;
use crate::domain::{ReactOutcome, ServiceError};
use async_trait::async_trait;
use fc_01_account::{
    AcceptRequestArgs, BridgeCall, ContractCall, RedeemIntentDeclared, StakeIntentDeclared,
    TransactionReceipt, TransactionSubmitter,
};
use fc_02_storage::{Message, MessageType, Repositories, Request};
use rand::RngCore;
use shared_bus::{Observer, ObserverError};
use shared_types::{keccak256, Address, Hash};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fresh 32-byte secret.
pub fn generate_secret() -> Hash {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    Hash::from(secret)
}

/// Accepts requests of one pool.
pub struct AcceptRequestService {
    name: String,
    request_type: MessageType,
    pool_address: Address,
    repositories: Arc<Repositories>,
    submitter: Arc<TransactionSubmitter>,
    inflight: InFlight<Hash>,
}

impl AcceptRequestService {
    /// `submitter` must send on the source chain of `request_type`, where
    /// the pool at `pool_address` lives.
    pub fn new(
        request_type: MessageType,
        pool_address: Address,
        repositories: Arc<Repositories>,
        submitter: Arc<TransactionSubmitter>,
    ) -> Self {
        let name = match request_type {
            MessageType::Stake => "accept-stake-request",
            MessageType::Redeem => "accept-redeem-request",
        };
        Self {
            name: name.to_string(),
            request_type,
            pool_address,
            repositories,
            submitter,
            inflight: InFlight::default(),
        }
    }

    fn declared_message_hash(&self, receipt: &TransactionReceipt) -> Option<Hash> {
        match self.request_type {
            MessageType::Stake => receipt.declared_message_hash::<StakeIntentDeclared>(),
            MessageType::Redeem => receipt.declared_message_hash::<RedeemIntentDeclared>(),
        }
    }

    /// Accepts `request` unless it is linked, already declared on chain, or
    /// being accepted.
    pub async fn react_to_request(&self, request: &Request) -> Result<ReactOutcome, ServiceError> {
        if request.request_type != self.request_type || request.message_hash.is_some() {
            self.inflight.release(&request.request_hash);
            return Ok(ReactOutcome::NothingPending);
        }
        if !self.inflight.try_claim(&request.request_hash) {
            return Ok(ReactOutcome::NothingPending);
        }

        match self.link_declared(request).await {
            Ok(None) => {}
            Ok(Some(message_hash)) => {
                self.inflight.release(&request.request_hash);
                info!(
                    request_hash = ?request.request_hash,
                    ?message_hash,
                    "Request already declared, linked without accepting"
                );
                return Ok(ReactOutcome::NothingPending);
            }
            Err(e) => {
                self.inflight.release(&request.request_hash);
                return Err(e);
            }
        }

        match self.accept(request).await {
            Ok(tx_hash) => Ok(ReactOutcome::Submitted {
                transaction_hashes: vec![tx_hash],
            }),
            Err(e) => {
                self.inflight.release(&request.request_hash);
                warn!(request_hash = ?request.request_hash, error = %e, "Accepting request failed");
                Err(e)
            }
        }
    }

    /// Links `request` to a message its proxy already declared with the same
    /// nonce. Returns the message hash the stored request ends up linked to.
    async fn link_declared(&self, request: &Request) -> Result<Option<Hash>, ServiceError> {
        let repos = &self.repositories;
        let Some(message) = repos
            .messages
            .find_declared_by(
                self.request_type,
                request.gateway_address,
                request.sender_proxy,
                request.nonce,
            )
            .await?
        else {
            return Ok(None);
        };

        let message_hash = message.message_hash;
        let _message_guard = repos.messages.lock(&message_hash).await;
        let _link_guard = repos
            .requests
            .lock_link(self.request_type, request.sender_proxy, request.nonce)
            .await;
        let _request_guard = repos.requests.lock(&request.request_hash).await;

        let Some(mut stored) = repos.requests.get(&request.request_hash).await? else {
            return Ok(None);
        };
        if stored.message_hash.is_some() {
            return Ok(stored.message_hash);
        }
        if repos.requests.find_by_message_hash(&message_hash).await?.is_some() {
            return Ok(None);
        }
        stored.message_hash = Some(message_hash);
        repos.requests.save(stored).await?;

        if let Some(mut message) = repos.messages.get(&message_hash).await? {
            if message.gas_price.is_zero() && message.gas_limit.is_zero() {
                message.gas_price = request.gas_price;
                message.gas_limit = request.gas_limit;
                repos.messages.save(message).await?;
            }
        }
        Ok(Some(message_hash))
    }

    async fn accept(&self, request: &Request) -> Result<Hash, ServiceError> {
        let repos = &self.repositories;
        let gateway = repos
            .gateways
            .get(request.gateway_address)
            .await?
            .ok_or(ServiceError::GatewayNotFound(request.gateway_address))?;

        let secret = generate_secret();
        let hash_lock = keccak256(secret.as_bytes());
        let args = AcceptRequestArgs {
            amount: request.amount,
            beneficiary: request.beneficiary,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            nonce: request.nonce,
            sender: request.sender,
            gateway: request.gateway_address,
            hash_lock,
        };
        let call = match self.request_type {
            MessageType::Stake => BridgeCall::AcceptStakeRequest(args),
            MessageType::Redeem => BridgeCall::AcceptRedeemRequest(args),
        };
        let receipt = self
            .submitter
            .submit(ContractCall::new(self.pool_address, call), gateway.bounty)
            .await?;
        let message_hash = self
            .declared_message_hash(&receipt)
            .ok_or(ServiceError::MissingMessageHash(receipt.transaction_hash))?;

        // Message stripe first, then request stripe.
        let _message_guard = repos.messages.lock(&message_hash).await;
        let mut message = repos.messages.get(&message_hash).await?.unwrap_or_else(|| {
            Message::new(
                message_hash,
                self.request_type,
                request.gateway_address,
                request.sender_proxy,
                request.nonce,
            )
        });
        message.gas_price = request.gas_price;
        message.gas_limit = request.gas_limit;
        message.record_hash_lock(hash_lock);
        if !message.record_secret(secret) {
            warn!(?message_hash, "Stored hash lock differs from the one just declared");
        }
        repos.messages.save(message).await?;

        let _link_guard = repos
            .requests
            .lock_link(self.request_type, request.sender_proxy, request.nonce)
            .await;
        let _request_guard = repos.requests.lock(&request.request_hash).await;
        if let Some(mut stored) = repos.requests.get(&request.request_hash).await? {
            if stored.message_hash.is_none() {
                stored.message_hash = Some(message_hash);
                repos.requests.save(stored).await?;
            } else {
                debug!(request_hash = ?request.request_hash, "Request linked meanwhile");
            }
        }

        info!(
            request_hash = ?request.request_hash,
            ?message_hash,
            tx_hash = ?receipt.transaction_hash,
            "Request accepted"
        );
        Ok(receipt.transaction_hash)
    }
}

#[async_trait]
impl Observer<Request> for AcceptRequestService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&self, updates: &[Request]) -> Result<(), ObserverError> {
        let mut failure = None;
        for request in updates {
            if let Err(e) = self.react_to_request(request).await {
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => Err(e.into_observer_error(&self.name)),
            None => Ok(()),
        }
    }
}
