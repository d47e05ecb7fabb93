//! # Subscriber
//!
//! Owns the live subscriptions of one chain side. Each (kind, contract)
//! target gets a task that sweeps once right after subscribing and again on
//! every push. Pushes that pile up during a sweep are coalesced into one.
//!
//! Stopping never interrupts a sweep: the stop signal is only observed
//! between sweeps, and `unsubscribe` waits for every task to return.

use super::fetcher::TransactionFetcher;
use crate::domain::{EventBatch, IndexError};
use crate::ports::{BatchSink, EventIndex, IndexSubscription};
use facilitator_telemetry::metrics::SWEEPS;
use fc_02_storage::EntityKind;
use parking_lot::Mutex;
use shared_types::{Address, ChainSide};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One subscribed (kind, contract) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionTarget {
    /// Chain the contract lives on.
    pub side: ChainSide,
    /// Event kind.
    pub kind: EntityKind,
    /// Emitting contract.
    pub contract: Address,
}

struct Running {
    stop: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

/// Subscriptions of one chain side.
pub struct Subscriber {
    side: ChainSide,
    index: Arc<dyn EventIndex>,
    fetcher: Arc<TransactionFetcher>,
    sink: Arc<dyn BatchSink>,
    targets: Vec<SubscriptionTarget>,
    running: Mutex<Option<Running>>,
}

impl Subscriber {
    /// Creates an idle subscriber for `targets`.
    pub fn new(
        side: ChainSide,
        index: Arc<dyn EventIndex>,
        fetcher: Arc<TransactionFetcher>,
        sink: Arc<dyn BatchSink>,
        targets: Vec<SubscriptionTarget>,
    ) -> Self {
        Self {
            side,
            index,
            fetcher,
            sink,
            targets,
            running: Mutex::new(None),
        }
    }

    /// Chain side served.
    pub fn side(&self) -> ChainSide {
        self.side
    }

    /// Configured targets.
    pub fn targets(&self) -> &[SubscriptionTarget] {
        &self.targets
    }

    /// Whether subscriptions are currently open.
    pub fn is_subscribed(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Opens every subscription and starts the sweep tasks.
    ///
    /// Already subscribed: no-op. If any subscription fails to open, the ones
    /// opened so far are torn down again and the error is returned.
    pub async fn subscribe(&self) -> Result<(), IndexError> {
        if self.is_subscribed() {
            return Ok(());
        }

        let mut subscriptions = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            // Dropping the collected subscriptions on error closes them.
            let subscription = self.index.subscribe(target.kind, target.contract).await?;
            subscriptions.push((*target, subscription));
        }

        let (stop, stop_rx) = watch::channel(false);
        let tasks = subscriptions
            .into_iter()
            .map(|(target, subscription)| {
                tokio::spawn(run_target(
                    target,
                    subscription,
                    self.fetcher.clone(),
                    self.sink.clone(),
                    stop_rx.clone(),
                ))
            })
            .collect();

        let previous = self.running.lock().replace(Running { stop, tasks });
        if let Some(previous) = previous {
            // Lost a race with a concurrent subscribe; keep the newer set.
            stop_running(previous).await;
        }
        info!(side = %self.side, targets = self.targets.len(), "Subscribed to event index");
        Ok(())
    }

    /// Stops push delivery and waits for in-flight sweeps to finish.
    ///
    /// Idempotent; a subscriber that never subscribed is a no-op.
    pub async fn unsubscribe(&self) {
        let running = self.running.lock().take();
        if let Some(running) = running {
            stop_running(running).await;
            info!(side = %self.side, "Unsubscribed from event index");
        }
    }

    /// Runs one sweep of `target` right now and returns the number of records
    /// delivered.
    pub async fn sweep(&self, target: &SubscriptionTarget) -> Result<usize, IndexError> {
        sweep_once(target, &self.fetcher, self.sink.as_ref()).await
    }
}

async fn stop_running(running: Running) {
    let _ = running.stop.send(true);
    for task in running.tasks {
        if let Err(e) = task.await {
            error!(error = %e, "Subscription task ended abnormally");
        }
    }
}

/// Fetch, deliver, commit. The cursor moves only after a successful delivery.
async fn sweep_once(
    target: &SubscriptionTarget,
    fetcher: &TransactionFetcher,
    sink: &dyn BatchSink,
) -> Result<usize, IndexError> {
    let kind = target.kind.index_entity();
    match fetch_deliver_commit(target, fetcher, sink).await {
        Ok((delivered, outcome)) => {
            SWEEPS.with_label_values(&[kind, outcome]).inc();
            Ok(delivered)
        }
        Err(e) => {
            SWEEPS.with_label_values(&[kind, "failed"]).inc();
            Err(e)
        }
    }
}

async fn fetch_deliver_commit(
    target: &SubscriptionTarget,
    fetcher: &TransactionFetcher,
    sink: &dyn BatchSink,
) -> Result<(usize, &'static str), IndexError> {
    let sweep = fetcher.fetch(target.kind, target.contract).await?;
    if sweep.is_empty() {
        return Ok((0, "empty"));
    }
    let delivered = sweep.records.len();
    if delivered > 0 {
        let mut batch = EventBatch::new();
        batch.insert(target.kind, sweep.records.clone());
        sink.deliver(batch).await?;
    }
    fetcher.commit(&sweep).await?;
    Ok((delivered, "committed"))
}

async fn run_target(
    target: SubscriptionTarget,
    mut subscription: IndexSubscription,
    fetcher: Arc<TransactionFetcher>,
    sink: Arc<dyn BatchSink>,
    mut stop: watch::Receiver<bool>,
) {
    let sweep_logged = |reason: &'static str| {
        let fetcher = fetcher.clone();
        let sink = sink.clone();
        async move {
            match sweep_once(&target, &fetcher, sink.as_ref()).await {
                Ok(0) => {}
                Ok(records) => debug!(
                    side = %target.side,
                    kind = %target.kind,
                    records,
                    reason,
                    "Sweep delivered"
                ),
                Err(e) => warn!(
                    side = %target.side,
                    kind = %target.kind,
                    contract = ?target.contract,
                    error = %e,
                    "Sweep aborted, cursor unchanged"
                ),
            }
        }
    };

    let stopped = *stop.borrow();
    if !stopped {
        sweep_logged("catch-up").await;
    }

    loop {
        let stopped = *stop.borrow();
        if stopped {
            break;
        }
        tokio::select! {
            biased;
            changed = stop.changed() => {
                let stopped = changed.is_err() || *stop.borrow();
                if stopped {
                    break;
                }
            }
            push = subscription.next_push() => {
                if push.is_none() {
                    warn!(side = %target.side, kind = %target.kind, "Push feed closed");
                    break;
                }
                subscription.drain_pending();
                sweep_logged("push").await;
            }
        }
    }

    subscription.close();
}
