//! # Observer
//!
//! The receiving side of a [`Subject`](crate::Subject).

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an observer while reacting to an update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observer {observer} failed: {reason}")]
pub struct ObserverError {
    /// Name of the failing observer.
    pub observer: String,
    /// Human-readable cause.
    pub reason: String,
}

impl ObserverError {
    /// Wraps any displayable error under the observer's name.
    pub fn new(observer: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            observer: observer.into(),
            reason: reason.to_string(),
        }
    }
}

/// Reacts to entities saved in a repository.
#[async_trait]
pub trait Observer<T>: Send + Sync {
    /// Name used in logs and metric labels.
    fn name(&self) -> &str;

    /// Called with every entity saved since the previous notification pass.
    async fn update(&self, updates: &[T]) -> Result<(), ObserverError>;
}
