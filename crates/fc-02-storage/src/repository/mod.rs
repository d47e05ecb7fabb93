//! # Repositories
//!
//! Typed tables over a [`KeyValueStore`]. Rows are bincode-encoded under
//! `<table>/<natural key>`.

mod auxiliary_chain;
mod cursor;
mod gateway;
mod message;
mod request;

pub use auxiliary_chain::AuxiliaryChainRepository;
pub use cursor::ContractEntityRepository;
pub use gateway::GatewayRepository;
pub use message::MessageRepository;
pub use request::RequestRepository;

use crate::domain::StorageError;
use crate::ports::{InMemoryKVStore, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_bus::Subject;
use std::sync::Arc;
use tracing::debug;

/// A row type with a natural key.
pub(crate) trait StoredEntity:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Table prefix.
    const TABLE: &'static str;

    /// Natural key bytes.
    fn key(&self) -> Vec<u8>;

    /// Rejects rows that must not be written.
    fn validate(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// One table plus the subject that publishes its saves.
pub(crate) struct Table<E> {
    store: Arc<dyn KeyValueStore>,
    subject: Subject<E>,
}

impl<E: StoredEntity> Table<E> {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            subject: Subject::new(E::TABLE),
        }
    }

    fn prefix() -> Vec<u8> {
        let mut prefix = E::TABLE.as_bytes().to_vec();
        prefix.push(b'/');
        prefix
    }

    fn row_key(key: &[u8]) -> Vec<u8> {
        let mut row_key = Self::prefix();
        row_key.extend_from_slice(key);
        row_key
    }

    fn decode(bytes: &[u8]) -> Result<E, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub(crate) async fn get(&self, key: &[u8]) -> Result<Option<E>, StorageError> {
        self.store
            .get(&Self::row_key(key))?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }

    /// Validates, writes and stages `entity`. Nothing is written or staged
    /// when validation fails.
    pub(crate) async fn save(&self, entity: E) -> Result<E, StorageError> {
        entity.validate()?;
        let bytes =
            bincode::serialize(&entity).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(&Self::row_key(&entity.key()), &bytes)?;
        debug!(table = E::TABLE, "Row saved");
        self.subject.stage(entity.clone());
        Ok(entity)
    }

    pub(crate) async fn scan(&self) -> Result<Vec<E>, StorageError> {
        self.store
            .prefix_scan(&Self::prefix())?
            .iter()
            .map(|(_, bytes)| Self::decode(bytes))
            .collect()
    }

    pub(crate) fn subject(&self) -> &Subject<E> {
        &self.subject
    }
}

/// All repositories of one facilitator process.
pub struct Repositories {
    /// Messages.
    pub messages: MessageRepository,
    /// Requests.
    pub requests: RequestRepository,
    /// Index cursors.
    pub cursors: ContractEntityRepository,
    /// Auxiliary chains.
    pub auxiliary_chains: AuxiliaryChainRepository,
    /// Gateways.
    pub gateways: GatewayRepository,
}

impl Repositories {
    /// Repositories over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            messages: MessageRepository::new(store.clone()),
            requests: RequestRepository::new(store.clone()),
            cursors: ContractEntityRepository::new(store.clone()),
            auxiliary_chains: AuxiliaryChainRepository::new(store.clone()),
            gateways: GatewayRepository::new(store),
        }
    }

    /// Repositories over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKVStore::new()))
    }

    /// Delivers everything saved since the last call to the attached
    /// observers. Returns the number of observer failures.
    pub async fn notify(&self) -> usize {
        let (messages, requests, cursors, chains, gateways) = futures::join!(
            self.messages.subject().notify(),
            self.requests.subject().notify(),
            self.cursors.subject().notify(),
            self.auxiliary_chains.subject().notify(),
            self.gateways.subject().notify(),
        );
        messages + requests + cursors + chains + gateways
    }
}
