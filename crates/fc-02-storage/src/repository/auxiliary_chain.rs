use super::{StoredEntity, Table};
use crate::domain::{AnchorRole, AuxiliaryChain, StorageError};
use crate::ports::KeyValueStore;
use shared_bus::Subject;
use shared_types::{Address, ChainId};
use std::sync::Arc;

impl StoredEntity for AuxiliaryChain {
    const TABLE: &'static str = "auxiliary_chain";

    fn key(&self) -> Vec<u8> {
        self.chain_id.to_be_bytes().to_vec()
    }
}

/// Auxiliary chains keyed by chain id.
pub struct AuxiliaryChainRepository {
    table: Table<AuxiliaryChain>,
}

impl AuxiliaryChainRepository {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: Table::new(store),
        }
    }

    /// Loads an auxiliary chain.
    pub async fn get(&self, chain_id: ChainId) -> Result<Option<AuxiliaryChain>, StorageError> {
        self.table.get(&chain_id.to_be_bytes()).await
    }

    /// Upserts an auxiliary chain and stages it for observers.
    pub async fn save(&self, chain: AuxiliaryChain) -> Result<AuxiliaryChain, StorageError> {
        self.table.save(chain).await
    }

    /// The chain one of whose anchors is `anchor_address`, with the anchor's role.
    pub async fn find_by_anchor(
        &self,
        anchor_address: Address,
    ) -> Result<Option<(AuxiliaryChain, AnchorRole)>, StorageError> {
        Ok(self
            .table
            .scan()
            .await?
            .into_iter()
            .find_map(|chain| chain.anchor_role(anchor_address).map(|role| (chain, role))))
    }

    /// Subject publishing saved chains.
    pub fn subject(&self) -> &Subject<AuxiliaryChain> {
        self.table.subject()
    }
}
