use super::{StoredEntity, Table};
use crate::domain::{Message, MessageDirection, MessageStatus, MessageType, StorageError};
use crate::locks::KeyedLocks;
use crate::ports::KeyValueStore;
use shared_bus::Subject;
use shared_types::{Address, BlockHeight, Hash, U256};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

impl StoredEntity for Message {
    const TABLE: &'static str = "message";

    fn key(&self) -> Vec<u8> {
        self.message_hash.as_bytes().to_vec()
    }

    fn validate(&self) -> Result<(), StorageError> {
        Message::validate(self)
    }
}

/// Messages keyed by message hash.
pub struct MessageRepository {
    table: Table<Message>,
    locks: KeyedLocks,
}

impl MessageRepository {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: Table::new(store),
            locks: KeyedLocks::default(),
        }
    }

    /// Holds the write lock of `message_hash` until the guard drops.
    pub async fn lock(&self, message_hash: &Hash) -> OwnedMutexGuard<()> {
        self.locks.lock(message_hash).await
    }

    /// Loads a message.
    pub async fn get(&self, message_hash: &Hash) -> Result<Option<Message>, StorageError> {
        self.table.get(message_hash.as_bytes()).await
    }

    /// Upserts a message and stages it for observers.
    pub async fn save(&self, message: Message) -> Result<Message, StorageError> {
        self.table.save(message).await
    }

    /// Messages of `gateway` travelling in `direction` that are declared on
    /// the source at or below `height` and not yet confirmed on the target.
    ///
    /// Ordered by declaration height, then hash.
    pub async fn pending_confirmation(
        &self,
        gateway: Address,
        direction: MessageDirection,
        height: BlockHeight,
    ) -> Result<Vec<Message>, StorageError> {
        let mut pending: Vec<Message> = self
            .table
            .scan()
            .await?
            .into_iter()
            .filter(|m| {
                m.gateway_address == gateway
                    && m.direction == direction
                    && m.awaits_confirmation_at(height)
            })
            .collect();
        pending.sort_by_key(|m| (m.source_declaration_block_height, m.message_hash));
        Ok(pending)
    }

    /// The message `sender` declared on `gateway` with `nonce`. Messages whose
    /// source declaration has not been seen yet do not count.
    pub async fn find_declared_by(
        &self,
        message_type: MessageType,
        gateway: Address,
        sender: Address,
        nonce: U256,
    ) -> Result<Option<Message>, StorageError> {
        Ok(self.table.scan().await?.into_iter().find(|m| {
            m.message_type == message_type
                && m.gateway_address == gateway
                && m.sender == sender
                && m.nonce == nonce
                && m.source_status != MessageStatus::Undeclared
        }))
    }

    /// All stored messages.
    pub async fn all(&self) -> Result<Vec<Message>, StorageError> {
        self.table.scan().await
    }

    /// Subject publishing saved messages.
    pub fn subject(&self) -> &Subject<Message> {
        self.table.subject()
    }
}
