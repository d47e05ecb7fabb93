use super::{StoredEntity, Table};
use crate::domain::{Gateway, StorageError};
use crate::ports::KeyValueStore;
use shared_bus::Subject;
use shared_types::Address;
use std::sync::Arc;

impl StoredEntity for Gateway {
    const TABLE: &'static str = "gateway";

    fn key(&self) -> Vec<u8> {
        self.gateway_address.as_bytes().to_vec()
    }

    fn validate(&self) -> Result<(), StorageError> {
        Gateway::validate(self)
    }
}

/// Gateways keyed by address.
pub struct GatewayRepository {
    table: Table<Gateway>,
}

impl GatewayRepository {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: Table::new(store),
        }
    }

    /// Loads a gateway.
    pub async fn get(&self, gateway_address: Address) -> Result<Option<Gateway>, StorageError> {
        self.table.get(gateway_address.as_bytes()).await
    }

    /// Upserts a gateway and stages it for observers.
    pub async fn save(&self, gateway: Gateway) -> Result<Gateway, StorageError> {
        self.table.save(gateway).await
    }

    /// Subject publishing saved gateways.
    pub fn subject(&self) -> &Subject<Gateway> {
        self.table.subject()
    }
}
