use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{EntityKind, Message, MessageType, Repositories, Request, Sighting};
use fc_03_event_index::{ChainEvent, IndexedRecord};
use shared_types::Hash;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `StakeRequested` / `RedeemRequested`: fork-tolerant request merge.
///
/// - unknown hash: insert, linked to the message its proxy already declared
///   with the same nonce, if the declaration was dispatched first
/// - sighting from a higher block: the earlier block was reorganized away;
///   take the new payload and unlink so the message is re-derived
/// - sighting from the same or a lower block: replay, nothing to write
pub struct RequestedHandler {
    request_type: MessageType,
    repositories: Arc<Repositories>,
}

impl RequestedHandler {
    /// Handler for requests of `request_type`.
    pub fn new(request_type: MessageType, repositories: Arc<Repositories>) -> Self {
        Self {
            request_type,
            repositories,
        }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let requested = match (&record.event, self.request_type) {
            (ChainEvent::StakeRequested(r), MessageType::Stake)
            | (ChainEvent::RedeemRequested(r), MessageType::Redeem) => r,
            (other, _) => return Err(unexpected("requested", other)),
        };

        let mut incoming = Request {
            request_hash: requested.request_hash,
            request_type: self.request_type,
            amount: requested.amount,
            beneficiary: requested.beneficiary,
            gas_price: requested.gas_price,
            gas_limit: requested.gas_limit,
            nonce: requested.nonce,
            gateway_address: requested.gateway,
            sender: requested.sender,
            sender_proxy: requested.sender_proxy,
            block_number: record.meta.block_number,
            message_hash: None,
        };

        let requests = &self.repositories.requests;
        let link_guard = requests
            .lock_link(self.request_type, incoming.sender_proxy, incoming.nonce)
            .await;
        let guard = requests.lock(&incoming.request_hash).await;
        let Some(mut stored) = requests.get(&incoming.request_hash).await? else {
            let declared = self.declared_message(&incoming).await?;
            incoming.message_hash = declared.as_ref().map(|m| m.message_hash);
            let written = applied(
                requests.save(incoming.clone()).await,
                self.kind(),
                &record.meta.id,
            )?;
            drop(guard);
            drop(link_guard);

            if let (true, Some(message)) = (written, declared) {
                debug!(
                    request_hash = ?incoming.request_hash,
                    message_hash = ?message.message_hash,
                    "Request linked to an earlier declaration"
                );
                self.adopt_reward(&message.message_hash, &incoming).await?;
            }
            return Ok(written);
        };

        match stored.absorb(incoming.clone()) {
            Sighting::Forked => {
                info!(
                    request_hash = ?stored.request_hash,
                    block = stored.block_number,
                    "Request re-mined in a later block, payload replaced"
                );
                applied(requests.save(stored).await, self.kind(), &record.meta.id)
            }
            Sighting::Stale => {
                if !stored.same_payload(&incoming) {
                    warn!(
                        request_hash = ?stored.request_hash,
                        stored_block = stored.block_number,
                        seen_block = incoming.block_number,
                        "Stale request sighting with a different payload ignored"
                    );
                } else {
                    debug!(request_hash = ?stored.request_hash, "Request replay");
                }
                if let Err(e) = stored.validate() {
                    warn!(request_hash = ?stored.request_hash, error = %e, "Stored request no longer valid");
                }
                Ok(false)
            }
        }
    }
}

impl RequestedHandler {
    /// Message declared for `request` that no other request claims yet.
    async fn declared_message(&self, request: &Request) -> Result<Option<Message>, HandlerError> {
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
        if repos.requests.find_by_message_hash(&message.message_hash).await?.is_some() {
            return Ok(None);
        }
        Ok(Some(message))
    }

    /// Copies the reward parameters onto a message declared before its
    /// request was seen.
    async fn adopt_reward(&self, message_hash: &Hash, request: &Request) -> Result<(), HandlerError> {
        let messages = &self.repositories.messages;
        let _guard = messages.lock(message_hash).await;
        if let Some(mut message) = messages.get(message_hash).await? {
            if message.gas_price.is_zero() && message.gas_limit.is_zero() {
                message.gas_price = request.gas_price;
                message.gas_limit = request.gas_limit;
                messages.save(message).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ContractEntityHandler for RequestedHandler {
    fn kind(&self) -> EntityKind {
        match self.request_type {
            MessageType::Stake => EntityKind::StakeRequested,
            MessageType::Redeem => EntityKind::RedeemRequested,
        }
    }

    async fn handle(&self, records: &[IndexedRecord]) -> Result<usize, HandlerError> {
        let mut written = 0;
        for record in records {
            if self.apply(record).await? {
                written += 1;
            }
        }
        Ok(written)
    }
}
