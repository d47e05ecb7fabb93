//! # Dispatch Channel
//!
//! Serializes batches from every subscriber task onto one dispatch loop.
//! Callers await the reply, so a subscriber commits its cursor only after
//! its batch was applied.

use super::dispatcher::{DispatchReport, TransactionDispatcher};
use crate::domain::DispatchError;
use async_trait::async_trait;
use fc_03_event_index::{BatchSink, EventBatch, IndexError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Commands accepted by the dispatch loop.
pub enum DispatchCommand {
    /// Apply a batch and reply with the outcome.
    Batch {
        /// Batch to apply.
        batch: EventBatch,
        /// Reply slot.
        reply: oneshot::Sender<Result<DispatchReport, DispatchError>>,
    },
    /// Finish queued batches, then stop.
    Shutdown,
}

/// Creates a dispatch loop and a handle feeding it.
pub fn dispatch_channel(
    dispatcher: Arc<TransactionDispatcher>,
    capacity: usize,
) -> (DispatchHandle, DispatchLoop) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        DispatchHandle { sender },
        DispatchLoop {
            receiver,
            dispatcher,
        },
    )
}

/// Cloneable sender side of the dispatch loop.
#[derive(Clone)]
pub struct DispatchHandle {
    sender: mpsc::Sender<DispatchCommand>,
}

impl DispatchHandle {
    /// Queues `batch` and waits until it was applied.
    pub async fn dispatch(&self, batch: EventBatch) -> Result<DispatchReport, DispatchError> {
        let (reply, outcome) = oneshot::channel();
        self.sender
            .send(DispatchCommand::Batch { batch, reply })
            .await
            .map_err(|_| DispatchError::Closed)?;
        outcome.await.map_err(|_| DispatchError::Closed)?
    }

    /// Asks the loop to stop after the batches already queued.
    pub async fn shutdown(&self) {
        if self.sender.send(DispatchCommand::Shutdown).await.is_err() {
            debug!("Dispatch loop already stopped");
        }
    }

    /// Whether the loop is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl BatchSink for DispatchHandle {
    async fn deliver(&self, batch: EventBatch) -> Result<(), IndexError> {
        self.dispatch(batch)
            .await
            .map(|_| ())
            .map_err(|e| IndexError::Dispatch(e.to_string()))
    }
}

/// Receiving side. Runs one batch at a time.
pub struct DispatchLoop {
    receiver: mpsc::Receiver<DispatchCommand>,
    dispatcher: Arc<TransactionDispatcher>,
}

impl DispatchLoop {
    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Dispatch loop started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                DispatchCommand::Batch { batch, reply } => self.apply(batch, reply).await,
                DispatchCommand::Shutdown => {
                    self.receiver.close();
                    while let Some(command) = self.receiver.recv().await {
                        if let DispatchCommand::Batch { batch, reply } = command {
                            self.apply(batch, reply).await;
                        }
                    }
                    break;
                }
            }
        }

        info!("Dispatch loop stopped");
    }

    async fn apply(
        &self,
        batch: EventBatch,
        reply: oneshot::Sender<Result<DispatchReport, DispatchError>>,
    ) {
        let outcome = self.dispatcher.dispatch(batch).await;
        if reply.send(outcome).is_err() {
            warn!("Dispatch caller went away before the reply");
        }
    }
}
