//! In-process [`EventIndex`] for tests and local runs.

use crate::domain::{IndexError, RecordMeta};
use crate::ports::{EventIndex, IndexSubscription, PageQuery};
use async_trait::async_trait;
use fc_02_storage::EntityKind;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

const PUSH_BUFFER: usize = 16;

type Feed = (EntityKind, Address);

struct StoredRecord {
    uts: u64,
    raw: Value,
}

/// Index held in memory. Inserting a record pushes to matching subscribers.
#[derive(Default)]
pub struct InMemoryEventIndex {
    records: RwLock<HashMap<Feed, Vec<StoredRecord>>>,
    feeds: Mutex<HashMap<Feed, Vec<mpsc::Sender<()>>>>,
    queries: AtomicUsize,
    failing_queries: AtomicUsize,
}

impl InMemoryEventIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw record and notifies subscribers of its feed.
    ///
    /// Only the common fields are checked here; the payload is stored as is.
    pub fn insert(&self, kind: EntityKind, raw: Value) -> Result<(), IndexError> {
        let meta = RecordMeta::decode(kind, &raw)?;
        let feed = (kind, meta.contract_address);
        {
            let mut records = self.records.write();
            let stored = records.entry(feed).or_default();
            stored.push(StoredRecord { uts: meta.uts, raw });
            stored.sort_by_key(|r| r.uts);
        }
        if let Some(senders) = self.feeds.lock().get_mut(&feed) {
            senders.retain(|tx| !tx.is_closed());
            for tx in senders.iter() {
                // A full buffer already guarantees a pending sweep.
                let _ = tx.try_send(());
            }
        }
        Ok(())
    }

    /// Page queries served so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Makes the next `n` queries fail.
    pub fn fail_next_queries(&self, n: usize) {
        self.failing_queries.store(n, Ordering::SeqCst);
    }

    /// Open push feeds across all kinds and contracts.
    pub fn subscriber_count(&self) -> usize {
        self.feeds
            .lock()
            .values()
            .flatten()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

#[async_trait]
impl EventIndex for InMemoryEventIndex {
    async fn subscribe(
        &self,
        kind: EntityKind,
        contract: Address,
    ) -> Result<IndexSubscription, IndexError> {
        let (tx, rx) = mpsc::channel(PUSH_BUFFER);
        self.feeds.lock().entry((kind, contract)).or_default().push(tx);
        Ok(IndexSubscription::new(rx, None))
    }

    async fn query(&self, kind: EntityKind, page: &PageQuery) -> Result<Vec<Value>, IndexError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_queries
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(IndexError::Query {
                kind,
                reason: "injected failure".to_string(),
            });
        }

        let records = self.records.read();
        Ok(records
            .get(&(kind, page.contract_address))
            .map(|stored| {
                stored
                    .iter()
                    .filter(|r| r.uts > page.uts_after)
                    .skip(page.skip)
                    .take(page.limit)
                    .map(|r| r.raw.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
