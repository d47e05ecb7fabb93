//! # Outbound Ports
//!
//! Dependencies of the index client on the outside world.

use crate::domain::{EventBatch, IndexError};
use async_trait::async_trait;
use fc_02_storage::EntityKind;
use serde_json::Value;
use shared_types::Address;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One page request against the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
    /// Emitting contract.
    pub contract_address: Address,
    /// Exclusive lower bound on `uts`.
    pub uts_after: u64,
    /// Records to skip.
    pub skip: usize,
    /// Page size.
    pub limit: usize,
}

/// A live subscription. Every received unit is a push: "something changed".
///
/// The payload of a push is never trusted; the subscriber sweeps instead.
pub struct IndexSubscription {
    pushes: mpsc::Receiver<()>,
    task: Option<JoinHandle<()>>,
}

impl IndexSubscription {
    /// Wraps a push channel and the task feeding it, if any.
    pub fn new(pushes: mpsc::Receiver<()>, task: Option<JoinHandle<()>>) -> Self {
        Self { pushes, task }
    }

    /// Waits for the next push. `None` once the feed is gone.
    pub async fn next_push(&mut self) -> Option<()> {
        self.pushes.recv().await
    }

    /// Drains pushes that already arrived. Returns how many.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while self.pushes.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    /// Stops the feed. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.pushes.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for IndexSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// The remote event index.
#[async_trait]
pub trait EventIndex: Send + Sync {
    /// Opens a push feed for `kind` records of `contract`.
    async fn subscribe(
        &self,
        kind: EntityKind,
        contract: Address,
    ) -> Result<IndexSubscription, IndexError>;

    /// Returns one page of raw records ordered by ascending `uts`.
    async fn query(&self, kind: EntityKind, page: &PageQuery) -> Result<Vec<Value>, IndexError>;
}

/// Consumer of decoded sweeps.
///
/// `deliver` returns once the batch has been fully applied; an error means
/// the sweep must not advance its cursor.
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Applies `batch`.
    async fn deliver(&self, batch: EventBatch) -> Result<(), IndexError>;
}
