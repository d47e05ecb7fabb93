use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{EntityKind, Message, MessageType, Repositories};
use fc_03_event_index::{ChainEvent, DeclaredRecord, IndexedRecord};
use std::sync::Arc;
use tracing::debug;

/// `StakeIntentDeclared` / `RedeemIntentDeclared` on the source gateway.
///
/// Marks the source side declared and links the originating request, found
/// by (proxy, nonce) among unlinked requests.
pub struct IntentDeclaredHandler {
    message_type: MessageType,
    repositories: Arc<Repositories>,
}

impl IntentDeclaredHandler {
    /// Handler for declarations of `message_type`.
    pub fn new(message_type: MessageType, repositories: Arc<Repositories>) -> Self {
        Self {
            message_type,
            repositories,
        }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let declared: &DeclaredRecord = match (&record.event, self.message_type) {
            (ChainEvent::StakeIntentDeclared(d), MessageType::Stake)
            | (ChainEvent::RedeemIntentDeclared(d), MessageType::Redeem) => d,
            (other, _) => return Err(unexpected("intent-declared", other)),
        };

        let messages = &self.repositories.messages;
        let requests = &self.repositories.requests;
        let _message_guard = messages.lock(&declared.message_hash).await;
        // Held until the message is saved so a request inserted next finds it.
        let _link_guard = requests
            .lock_link(self.message_type, declared.sender, declared.nonce)
            .await;

        let existing = messages.get(&declared.message_hash).await?;
        let is_new = existing.is_none();
        let mut message = existing.unwrap_or_else(|| {
            Message::new(
                declared.message_hash,
                self.message_type,
                record.meta.contract_address,
                declared.sender,
                declared.nonce,
            )
        });

        // Link the request that turned into this message, if one is waiting.
        if let Some(candidate) = requests
            .find_unlinked(self.message_type, declared.sender, declared.nonce)
            .await?
        {
            let _request_guard = requests.lock(&candidate.request_hash).await;
            if let Some(mut request) = requests.get(&candidate.request_hash).await? {
                if request.message_hash.is_none() {
                    request.message_hash = Some(declared.message_hash);
                    if is_new {
                        message.gas_price = request.gas_price;
                        message.gas_limit = request.gas_limit;
                    }
                    debug!(
                        request_hash = ?request.request_hash,
                        message_hash = ?declared.message_hash,
                        "Request linked to message"
                    );
                    applied(requests.save(request).await, self.kind(), &record.meta.id)?;
                }
            }
        }

        let changed = message.declare_source(record.meta.block_number);
        if !(changed || is_new) {
            return Ok(false);
        }
        applied(messages.save(message).await, self.kind(), &record.meta.id)
    }
}

#[async_trait]
impl ContractEntityHandler for IntentDeclaredHandler {
    fn kind(&self) -> EntityKind {
        match self.message_type {
            MessageType::Stake => EntityKind::StakeIntentDeclared,
            MessageType::Redeem => EntityKind::RedeemIntentDeclared,
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
