//! # Transaction Fetcher
//!
//! Paginated sweeps over one (kind, contract) pair, starting after the stored
//! `uts` cursor. The cursor is only moved by [`TransactionFetcher::commit`],
//! which callers run after the swept records were applied.

use crate::domain::{IndexError, IndexedRecord, RecordMeta};
use crate::ports::{EventIndex, PageQuery};
use facilitator_telemetry::metrics::{CURSOR_UTS, RECORDS_FETCHED};
use fc_02_storage::{EntityKind, Repositories};
use shared_types::Address;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default page size of a sweep.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Result of one sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sweep {
    /// Swept kind.
    pub kind: EntityKind,
    /// Swept contract.
    pub contract: Address,
    /// Cursor the sweep started after.
    pub started_after: u64,
    /// Decoded records in index order.
    pub records: Vec<IndexedRecord>,
    /// Highest `uts` seen, including records that failed to decode.
    pub max_uts: Option<u64>,
}

impl Sweep {
    /// Whether the sweep consumed anything at all.
    pub fn is_empty(&self) -> bool {
        self.max_uts.is_none()
    }
}

/// Fetches pages from an [`EventIndex`] and owns cursor commits.
pub struct TransactionFetcher {
    index: Arc<dyn EventIndex>,
    repositories: Arc<Repositories>,
    page_size: usize,
}

impl TransactionFetcher {
    /// Creates a fetcher. A zero `page_size` falls back to the default.
    pub fn new(index: Arc<dyn EventIndex>, repositories: Arc<Repositories>, page_size: usize) -> Self {
        Self {
            index,
            repositories,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Page size in use.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetches every record after the stored cursor, page by page, until the
    /// index returns an empty page.
    ///
    /// Records that cannot be decoded are logged and skipped. A failing page
    /// aborts the whole sweep.
    pub async fn fetch(&self, kind: EntityKind, contract: Address) -> Result<Sweep, IndexError> {
        let started_after = self.repositories.cursors.cursor(contract, kind).await?;
        let mut sweep = Sweep {
            kind,
            contract,
            started_after,
            records: Vec::new(),
            max_uts: None,
        };

        let mut skip = 0;
        loop {
            let page = self
                .index
                .query(
                    kind,
                    &PageQuery {
                        contract_address: contract,
                        uts_after: started_after,
                        skip,
                        limit: self.page_size,
                    },
                )
                .await?;
            if page.is_empty() {
                break;
            }
            skip += page.len();
            RECORDS_FETCHED
                .with_label_values(&[kind.index_entity()])
                .inc_by(page.len() as u64);

            for raw in &page {
                let meta = match RecordMeta::decode(kind, raw) {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!(%kind, error = %e, "Skipping record without readable metadata");
                        continue;
                    }
                };
                sweep.max_uts = sweep.max_uts.max(Some(meta.uts));
                match IndexedRecord::decode(kind, raw) {
                    Ok(record) => sweep.records.push(record),
                    Err(e) => warn!(%kind, id = %meta.id, error = %e, "Skipping undecodable record"),
                }
            }
        }

        debug!(
            %kind,
            contract = ?contract,
            records = sweep.records.len(),
            after = started_after,
            "Sweep fetched"
        );
        Ok(sweep)
    }

    /// Moves the cursor to the sweep's highest `uts`. Never regresses.
    /// Returns the committed cursor.
    pub async fn commit(&self, sweep: &Sweep) -> Result<u64, IndexError> {
        let Some(uts) = sweep.max_uts else {
            return Ok(sweep.started_after);
        };
        let committed = self
            .repositories
            .cursors
            .advance(sweep.contract, sweep.kind, uts)
            .await?;
        CURSOR_UTS
            .with_label_values(&[sweep.kind.index_entity()])
            .set(i64::try_from(committed).unwrap_or(i64::MAX));
        Ok(committed)
    }
}
