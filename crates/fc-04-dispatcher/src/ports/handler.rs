use crate::domain::HandlerError;
use async_trait::async_trait;
use fc_02_storage::EntityKind;
use fc_03_event_index::IndexedRecord;

/// Folds records of one kind into storage.
///
/// Implementations must be idempotent: the same records may arrive again
/// after a failed sweep.
#[async_trait]
pub trait ContractEntityHandler: Send + Sync {
    /// Kind this handler consumes.
    fn kind(&self) -> EntityKind;

    /// Applies `records` in order. Returns the number of rows written.
    async fn handle(&self, records: &[IndexedRecord]) -> Result<usize, HandlerError>;
}
