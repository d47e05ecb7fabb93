//! # Storage Backends
//!
//! `memory` is always available. `rocksdb` needs the `rocksdb` feature:
//!
//! ```toml
//! facilitator-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::container::{ConfigError, StorageConfig};
use fc_02_storage::{InMemoryKVStore, KeyValueStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Failure to open the configured store.
#[derive(Debug, Error)]
pub enum OpenStoreError {
    /// The backend is not available.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The backend failed to open.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Opens the store selected by `config.backend`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, OpenStoreError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory store; state is lost on exit");
            Ok(Arc::new(InMemoryKVStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        "rocksdb" => {
            info!(path = %config.data_dir.display(), "Opening RocksDB store");
            Ok(Arc::new(RocksDbStore::open(RocksDbConfig::at(&config.data_dir))?))
        }
        other => Err(ConfigError::UnsupportedBackend(other.to_string()).into()),
    }
}
