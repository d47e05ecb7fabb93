use super::{StoredEntity, Table};
use crate::domain::{MessageType, Request, StorageError};
use crate::locks::KeyedLocks;
use crate::ports::KeyValueStore;
use shared_bus::Subject;
use shared_types::{keccak256, Address, Hash, U256};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

impl StoredEntity for Request {
    const TABLE: &'static str = "request";

    fn key(&self) -> Vec<u8> {
        self.request_hash.as_bytes().to_vec()
    }

    fn validate(&self) -> Result<(), StorageError> {
        Request::validate(self)
    }
}

/// Requests keyed by request hash.
pub struct RequestRepository {
    table: Table<Request>,
    locks: KeyedLocks,
    links: KeyedLocks,
}

impl RequestRepository {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: Table::new(store),
            locks: KeyedLocks::default(),
            links: KeyedLocks::default(),
        }
    }

    /// Holds the write lock of `request_hash` until the guard drops.
    pub async fn lock(&self, request_hash: &Hash) -> OwnedMutexGuard<()> {
        self.locks.lock(request_hash).await
    }

    /// Serializes linking of requests opened through `sender_proxy` with
    /// `nonce`: whoever holds the guard sees every message or request the
    /// previous holder wrote for that pair.
    pub async fn lock_link(
        &self,
        request_type: MessageType,
        sender_proxy: Address,
        nonce: U256,
    ) -> OwnedMutexGuard<()> {
        let mut key = Vec::with_capacity(1 + 20 + 32);
        key.push(request_type as u8);
        key.extend_from_slice(sender_proxy.as_bytes());
        let mut word = [0u8; 32];
        nonce.to_big_endian(&mut word);
        key.extend_from_slice(&word);
        self.links.lock(&keccak256(key)).await
    }

    /// Loads a request.
    pub async fn get(&self, request_hash: &Hash) -> Result<Option<Request>, StorageError> {
        self.table.get(request_hash.as_bytes()).await
    }

    /// Upserts a request and stages it for observers.
    pub async fn save(&self, request: Request) -> Result<Request, StorageError> {
        self.table.save(request).await
    }

    /// The not-yet-linked request whose proxy declared `nonce`.
    ///
    /// If several match (a fork left a stale twin behind), the one from the
    /// highest block wins.
    pub async fn find_unlinked(
        &self,
        request_type: MessageType,
        sender_proxy: Address,
        nonce: U256,
    ) -> Result<Option<Request>, StorageError> {
        Ok(self
            .table
            .scan()
            .await?
            .into_iter()
            .filter(|r| {
                r.request_type == request_type
                    && r.sender_proxy == sender_proxy
                    && r.nonce == nonce
                    && r.message_hash.is_none()
            })
            .max_by_key(|r| r.block_number))
    }

    /// The request linked to `message_hash`.
    pub async fn find_by_message_hash(
        &self,
        message_hash: &Hash,
    ) -> Result<Option<Request>, StorageError> {
        Ok(self
            .table
            .scan()
            .await?
            .into_iter()
            .find(|r| r.message_hash.as_ref() == Some(message_hash)))
    }

    /// Subject publishing saved requests.
    pub fn subject(&self) -> &Subject<Request> {
        self.table.subject()
    }
}
