use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{EntityKind, Message, MessageType, Repositories};
use fc_03_event_index::{ChainEvent, IndexedRecord, ProgressedRecord};
use shared_types::Address;
use std::sync::Arc;
use tracing::warn;

/// Side of the message a progress event completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressSide {
    /// Emitted by the source gateway (`StakeProgressed`, `RedeemProgressed`).
    Source,
    /// Emitted by the target gateway (`MintProgressed`, `UnstakeProgressed`).
    Target,
}

/// Any of the four progress events.
///
/// Progress is terminal: it applies from any prior status. The revealed
/// secret is recorded unless the event reports proof-based progress.
pub struct ProgressedHandler {
    kind: EntityKind,
    message_type: MessageType,
    side: ProgressSide,
    repositories: Arc<Repositories>,
}

impl ProgressedHandler {
    /// Handler for `kind`, which must be one of the progress kinds.
    pub fn new(kind: EntityKind, repositories: Arc<Repositories>) -> Option<Self> {
        let (message_type, side) = match kind {
            EntityKind::StakeProgressed => (MessageType::Stake, ProgressSide::Source),
            EntityKind::MintProgressed => (MessageType::Stake, ProgressSide::Target),
            EntityKind::RedeemProgressed => (MessageType::Redeem, ProgressSide::Source),
            EntityKind::UnstakeProgressed => (MessageType::Redeem, ProgressSide::Target),
            _ => return None,
        };
        Some(Self {
            kind,
            message_type,
            side,
            repositories,
        })
    }

    /// Side this handler progresses.
    pub fn side(&self) -> ProgressSide {
        self.side
    }

    fn progressed<'a>(&self, event: &'a ChainEvent) -> Option<&'a ProgressedRecord> {
        match event {
            ChainEvent::StakeProgressed(p)
            | ChainEvent::MintProgressed(p)
            | ChainEvent::RedeemProgressed(p)
            | ChainEvent::UnstakeProgressed(p)
                if event.kind() == self.kind =>
            {
                Some(p)
            }
            _ => None,
        }
    }

    async fn source_gateway(&self, emitter: Address) -> Result<Address, HandlerError> {
        match self.side {
            ProgressSide::Source => Ok(emitter),
            ProgressSide::Target => self
                .repositories
                .gateways
                .get(emitter)
                .await?
                .map(|gateway| gateway.remote_gateway_address)
                .ok_or_else(|| HandlerError::MissingMetadata(format!("gateway {emitter:?}"))),
        }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let Some(progressed) = self.progressed(&record.event) else {
            return Err(unexpected("progressed", &record.event));
        };

        let messages = &self.repositories.messages;
        let _guard = messages.lock(&progressed.message_hash).await;

        let (mut message, is_new) = match messages.get(&progressed.message_hash).await? {
            Some(message) => (message, false),
            None => {
                let gateway = self.source_gateway(record.meta.contract_address).await?;
                let message = Message::new(
                    progressed.message_hash,
                    self.message_type,
                    gateway,
                    progressed.sender,
                    progressed.nonce.unwrap_or_default(),
                );
                (message, true)
            }
        };

        let mut changed = match self.side {
            ProgressSide::Source => message.progress_source(),
            ProgressSide::Target => message.progress_target(),
        };

        let secret = progressed.unlock_secret;
        if !progressed.proof_progress && !secret.is_zero() && message.secret != Some(secret) {
            if message.record_secret(secret) {
                changed = true;
            } else {
                warn!(
                    message_hash = ?message.message_hash,
                    id = %record.meta.id,
                    "Revealed secret does not match hash lock"
                );
            }
        }

        if !(changed || is_new) {
            return Ok(false);
        }
        applied(messages.save(message).await, self.kind, &record.meta.id)
    }
}

#[async_trait]
impl ContractEntityHandler for ProgressedHandler {
    fn kind(&self) -> EntityKind {
        self.kind
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
