use super::{StoredEntity, Table};
use crate::domain::{ContractEntity, EntityKind, StorageError};
use crate::ports::KeyValueStore;
use shared_bus::Subject;
use shared_types::Address;
use std::sync::Arc;

fn cursor_key(contract_address: Address, kind: EntityKind) -> Vec<u8> {
    let mut key = contract_address.as_bytes().to_vec();
    key.push(kind.code());
    key
}

impl StoredEntity for ContractEntity {
    const TABLE: &'static str = "cursor";

    fn key(&self) -> Vec<u8> {
        cursor_key(self.contract_address, self.entity_kind)
    }
}

/// Index cursors keyed by (contract, kind).
pub struct ContractEntityRepository {
    table: Table<ContractEntity>,
}

impl ContractEntityRepository {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: Table::new(store),
        }
    }

    /// Loads a cursor row.
    pub async fn get(
        &self,
        contract_address: Address,
        kind: EntityKind,
    ) -> Result<Option<ContractEntity>, StorageError> {
        self.table.get(&cursor_key(contract_address, kind)).await
    }

    /// Last consumed `uts`, zero when nothing was consumed yet.
    pub async fn cursor(
        &self,
        contract_address: Address,
        kind: EntityKind,
    ) -> Result<u64, StorageError> {
        Ok(self
            .get(contract_address, kind)
            .await?
            .map_or(0, |row| row.timestamp))
    }

    /// Moves the cursor forward to `uts`. A smaller value is ignored.
    /// Returns the committed cursor.
    pub async fn advance(
        &self,
        contract_address: Address,
        kind: EntityKind,
        uts: u64,
    ) -> Result<u64, StorageError> {
        let mut row = self
            .get(contract_address, kind)
            .await?
            .unwrap_or(ContractEntity {
                contract_address,
                entity_kind: kind,
                timestamp: 0,
            });
        if row.advance(uts) {
            row = self.table.save(row).await?;
        }
        Ok(row.timestamp)
    }

    /// Subject publishing saved cursors.
    pub fn subject(&self) -> &Subject<ContractEntity> {
        self.table.subject()
    }
}
