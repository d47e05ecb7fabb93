use super::{applied, unexpected};
use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use async_trait::async_trait;
use fc_02_storage::{EntityKind, Repositories};
use fc_03_event_index::{ChainEvent, IndexedRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// `GatewayProven`: the emitting gateway now trusts its remote gateway's
/// storage at the proven height.
pub struct GatewayProvenHandler {
    repositories: Arc<Repositories>,
}

impl GatewayProvenHandler {
    /// Creates the handler.
    pub fn new(repositories: Arc<Repositories>) -> Self {
        Self { repositories }
    }

    async fn apply(&self, record: &IndexedRecord) -> Result<bool, HandlerError> {
        let ChainEvent::GatewayProven(proven) = &record.event else {
            return Err(unexpected("gateway-proven", &record.event));
        };

        let address = record.meta.contract_address;
        let gateways = &self.repositories.gateways;
        let mut gateway = gateways
            .get(address)
            .await?
            .ok_or_else(|| HandlerError::MissingMetadata(format!("gateway {address:?}")))?;

        if proven.remote_gateway != gateway.remote_gateway_address {
            warn!(
                gateway = ?address,
                proven = ?proven.remote_gateway,
                "Proven gateway is not the configured remote gateway"
            );
        }
        if !gateway.record_proven_height(proven.block_height) {
            return Ok(false);
        }
        debug!(gateway = ?address, height = proven.block_height, "Remote gateway proven");
        applied(gateways.save(gateway).await, EntityKind::GatewayProven, &record.meta.id)
    }
}

#[async_trait]
impl ContractEntityHandler for GatewayProvenHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::GatewayProven
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
