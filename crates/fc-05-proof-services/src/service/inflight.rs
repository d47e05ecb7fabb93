//! Keys a service has submitted for and whose confirming event has not
//! arrived yet.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of claimed keys.
pub struct InFlight<K> {
    keys: Mutex<HashSet<K>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    /// Claims `key`. `false` if it is already claimed.
    pub fn try_claim(&self, key: &K) -> bool {
        self.keys.lock().insert(key.clone())
    }

    /// Releases `key` so the next trigger may submit again.
    pub fn release(&self, key: &K) {
        self.keys.lock().remove(key);
    }

    /// Whether `key` is claimed.
    pub fn contains(&self, key: &K) -> bool {
        self.keys.lock().contains(key)
    }

    /// Drops every claim `keep` rejects.
    pub fn retain(&self, keep: impl Fn(&K) -> bool) {
        self.keys.lock().retain(|key| keep(key));
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// Whether nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
