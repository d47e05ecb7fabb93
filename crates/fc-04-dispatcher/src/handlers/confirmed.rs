use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{EntityKind, Message, MessageType, Repositories};
use fc_03_event_index::{ChainEvent, ConfirmedRecord, IndexedRecord};
use std::sync::Arc;

/// `StakeIntentConfirmed` / `RedeemIntentConfirmed` on the target gateway.
///
/// The event is emitted by the target gateway; the message belongs to its
/// remote (source) gateway, which is resolved through the gateway table.
pub struct IntentConfirmedHandler {
    message_type: MessageType,
    repositories: Arc<Repositories>,
}

impl IntentConfirmedHandler {
    /// Handler for confirmations of `message_type`.
    pub fn new(message_type: MessageType, repositories: Arc<Repositories>) -> Self {
        Self {
            message_type,
            repositories,
        }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let confirmed: &ConfirmedRecord = match (&record.event, self.message_type) {
            (ChainEvent::StakeIntentConfirmed(c), MessageType::Stake)
            | (ChainEvent::RedeemIntentConfirmed(c), MessageType::Redeem) => c,
            (other, _) => return Err(unexpected("intent-confirmed", other)),
        };

        let messages = &self.repositories.messages;
        let _guard = messages.lock(&confirmed.message_hash).await;

        let (mut message, is_new) = match messages.get(&confirmed.message_hash).await? {
            Some(message) => (message, false),
            None => {
                let target = record.meta.contract_address;
                let gateway = self.repositories.gateways.get(target).await?.ok_or_else(|| {
                    HandlerError::MissingMetadata(format!("gateway {target:?}"))
                })?;
                let message = Message::new(
                    confirmed.message_hash,
                    self.message_type,
                    gateway.remote_gateway_address,
                    confirmed.sender,
                    confirmed.nonce,
                );
                (message, true)
            }
        };

        let had_lock = message.hash_lock.is_some();
        message.record_hash_lock(confirmed.hash_lock);
        let changed = message.declare_target() || (!had_lock && message.hash_lock.is_some());
        if !(changed || is_new) {
            return Ok(false);
        }
        applied(messages.save(message).await, self.kind(), &record.meta.id)
    }
}

#[async_trait]
impl ContractEntityHandler for IntentConfirmedHandler {
    fn kind(&self) -> EntityKind {
        match self.message_type {
            MessageType::Stake => EntityKind::StakeIntentConfirmed,
            MessageType::Redeem => EntityKind::RedeemIntentConfirmed,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{confirmed, seeded_repositories, ORIGIN_GATEWAY};
    use fc_02_storage::MessageStatus;
    use shared_types::{keccak256, Hash};

    #[tokio::test]
    async fn test_confirm_unknown_message_resolves_source_gateway() {
        let repos = seeded_repositories().await;
        let hash_lock = keccak256(b"secret");
        IntentConfirmedHandler::new(MessageType::Stake, repos.clone())
            .handle(&[confirmed(MessageType::Stake, 0x20, 30, hash_lock)])
            .await
            .unwrap();

        let message = repos.messages.get(&Hash::repeat_byte(0x20)).await.unwrap().unwrap();
        assert_eq!(message.gateway_address, ORIGIN_GATEWAY);
        assert_eq!(message.target_status, MessageStatus::Declared);
        assert_eq!(message.source_status, MessageStatus::Undeclared);
        assert_eq!(message.hash_lock, Some(hash_lock));
    }

    #[tokio::test]
    async fn test_confirm_replay_writes_nothing() {
        let repos = seeded_repositories().await;
        let handler = IntentConfirmedHandler::new(MessageType::Stake, repos.clone());
        let record = confirmed(MessageType::Stake, 0x20, 30, keccak256(b"secret"));
        assert_eq!(handler.handle(&[record.clone()]).await.unwrap(), 1);
        assert_eq!(handler.handle(&[record]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_gateway_is_missing_metadata() {
        let repos = Arc::new(Repositories::in_memory());
        let result = IntentConfirmedHandler::new(MessageType::Stake, repos)
            .handle(&[confirmed(MessageType::Stake, 0x20, 30, keccak256(b"s"))])
            .await;
        assert!(matches!(result, Err(HandlerError::MissingMetadata(_))));
    }
}
