use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{AnchorRole, EntityKind, Repositories};
use fc_03_event_index::{ChainEvent, IndexedRecord};
use std::sync::Arc;
use tracing::debug;

/// `StateRootAvailable`: records the latest anchored height of the remote
/// chain on the auxiliary chain row whose anchor emitted the event.
pub struct StateRootAvailableHandler {
    repositories: Arc<Repositories>,
}

impl StateRootAvailableHandler {
    /// Creates the handler.
    pub fn new(repositories: Arc<Repositories>) -> Self {
        Self { repositories }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let ChainEvent::StateRootAvailable(available) = &record.event else {
            return Err(unexpected("state-root-available", &record.event));
        };

        let anchor = record.meta.contract_address;
        let chains = &self.repositories.auxiliary_chains;
        let (mut chain, role) = chains
            .find_by_anchor(anchor)
            .await?
            .ok_or_else(|| HandlerError::MissingMetadata(format!("anchor {anchor:?}")))?;

        let raised = match role {
            AnchorRole::OriginRoots => chain.record_origin_height(available.block_height),
            AnchorRole::AuxiliaryRoots => chain.record_auxiliary_height(available.block_height),
        };
        if !raised {
            return Ok(false);
        }
        debug!(chain_id = chain.chain_id, ?role, height = available.block_height, "State root anchored");
        applied(chains.save(chain).await, EntityKind::StateRootAvailable, &record.meta.id)
    }
}

#[async_trait]
impl ContractEntityHandler for StateRootAvailableHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::StateRootAvailable
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
    use crate::handlers::testing::{
        seeded_repositories, state_root, AUXILIARY_ANCHOR, CHAIN_ID, ORIGIN_ANCHOR,
    };

    #[tokio::test]
    async fn test_heights_follow_anchor_role_and_never_drop() {
        let repos = seeded_repositories().await;
        let handler = StateRootAvailableHandler::new(repos.clone());

        handler
            .handle(&[
                state_root(AUXILIARY_ANCHOR, 100),
                state_root(AUXILIARY_ANCHOR, 90),
                state_root(ORIGIN_ANCHOR, 7),
            ])
            .await
            .unwrap();

        let chain = repos.auxiliary_chains.get(CHAIN_ID).await.unwrap().unwrap();
        assert_eq!(chain.last_origin_block_height, Some(100));
        assert_eq!(chain.last_auxiliary_block_height, Some(7));
    }
}
