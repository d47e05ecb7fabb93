//! # Transaction Dispatcher
//!
//! Routes each kind of a batch to its handler. Kinds run concurrently,
//! records of one kind run in order. Once every handler has returned, one
//! notification pass delivers the saved entities to the observers.

use crate::domain::{DispatchError, HandlerError};
use crate::handlers::standard_handlers;
use crate::ports::ContractEntityHandler;
use facilitator_telemetry::metrics::{DISPATCH_FAILURES, RECORDS_HANDLED};
use fc_02_storage::{EntityKind, Repositories};
use fc_03_event_index::EventBatch;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of a successful dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records routed to handlers.
    pub records: usize,
    /// Rows the handlers wrote.
    pub written: usize,
    /// Observers that failed during the notification pass.
    pub observer_failures: usize,
}

/// Kind-to-handler routing table plus the repositories to notify.
pub struct TransactionDispatcher {
    handlers: HashMap<EntityKind, Arc<dyn ContractEntityHandler>>,
    repositories: Arc<Repositories>,
}

impl TransactionDispatcher {
    /// Dispatcher without handlers.
    pub fn new(repositories: Arc<Repositories>) -> Self {
        Self {
            handlers: HashMap::new(),
            repositories,
        }
    }

    /// Dispatcher with a handler for every kind.
    pub fn with_standard_handlers(repositories: Arc<Repositories>) -> Self {
        let mut dispatcher = Self::new(repositories.clone());
        for handler in standard_handlers(repositories) {
            dispatcher.register(handler);
        }
        dispatcher
    }

    /// Registers `handler` for its kind, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ContractEntityHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Whether a handler exists for `kind`.
    pub fn handles(&self, kind: EntityKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Applies `batch`.
    ///
    /// Every non-empty kind must have a handler; this is checked before any
    /// handler runs. The notification pass runs even when a handler failed,
    /// so rows that were saved are still observed.
    pub async fn dispatch(&self, batch: EventBatch) -> Result<DispatchReport, DispatchError> {
        let mut routed = Vec::with_capacity(batch.len());
        for (kind, records) in &batch {
            if records.is_empty() {
                continue;
            }
            let handler = self
                .handlers
                .get(kind)
                .ok_or(DispatchError::HandlerNotFound(*kind))?;
            routed.push((*kind, handler.clone(), records));
        }

        let records = routed.iter().map(|(_, _, records)| records.len()).sum();
        let results: Vec<(EntityKind, usize, Result<usize, HandlerError>)> =
            join_all(routed.into_iter().map(|(kind, handler, records)| async move {
                (kind, records.len(), handler.handle(records).await)
            }))
            .await;

        let mut written = 0;
        let mut failure = None;
        for (kind, count, result) in results {
            match result {
                Ok(n) => {
                    written += n;
                    RECORDS_HANDLED
                        .with_label_values(&[kind.index_entity()])
                        .inc_by(count as u64);
                }
                Err(e) => {
                    DISPATCH_FAILURES.with_label_values(&[kind.index_entity()]).inc();
                    error!(%kind, error = %e, "Handler failed");
                    failure.get_or_insert(DispatchError::Handler { kind, source: e });
                }
            }
        }

        let observer_failures = self.repositories.notify().await;
        debug!(records, written, observer_failures, "Batch dispatched");

        match failure {
            Some(e) => Err(e),
            None => Ok(DispatchReport {
                records,
                written,
                observer_failures,
            }),
        }
    }
}
