//! # Subject
//!
//! Holds the observer list of one repository and the entities staged since
//! the last notification pass.

use crate::observer::Observer;
use facilitator_telemetry::metrics::OBSERVER_FAILURES;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fan-out point for one entity type.
pub struct Subject<T> {
    name: &'static str,
    observers: RwLock<Vec<Arc<dyn Observer<T>>>>,
    staged: Mutex<Vec<T>>,
}

impl<T> Subject<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a subject with no observers.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            observers: RwLock::new(Vec::new()),
            staged: Mutex::new(Vec::new()),
        }
    }

    /// Name of the entity type this subject publishes.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers an observer. Done once, while wiring the process.
    pub fn attach(&self, observer: Arc<dyn Observer<T>>) {
        debug!(subject = self.name, observer = observer.name(), "Observer attached");
        self.observers.write().push(observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Queues a saved entity for the next notification pass.
    pub fn stage(&self, entity: T) {
        self.staged.lock().push(entity);
    }

    /// Number of entities waiting for delivery.
    pub fn staged_count(&self) -> usize {
        self.staged.lock().len()
    }

    /// Delivers all staged entities to every observer.
    ///
    /// Observers run concurrently on the same slice. Returns the number of
    /// observers that reported a failure.
    pub async fn notify(&self) -> usize {
        let updates: Vec<T> = std::mem::take(&mut *self.staged.lock());
        if updates.is_empty() {
            return 0;
        }
        let observers: Vec<Arc<dyn Observer<T>>> = self.observers.read().clone();
        if observers.is_empty() {
            return 0;
        }

        debug!(
            subject = self.name,
            updates = updates.len(),
            observers = observers.len(),
            "Notifying observers"
        );

        let results = join_all(observers.iter().map(|o| o.update(&updates))).await;

        let mut failures = 0;
        for error in results.into_iter().filter_map(Result::err) {
            failures += 1;
            OBSERVER_FAILURES.with_label_values(&[&error.observer]).inc();
            warn!(subject = self.name, observer = %error.observer, reason = %error.reason, "Observer failed");
        }
        failures
    }
}
