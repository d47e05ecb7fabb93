//! # Facilitator Configuration
//!
//! Loaded from a JSON file (`FC_CONFIG`, default `facilitator.json`).
//! Secrets and the data directory can be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FC_ORIGIN_PASSWORD` | `origin.password` |
//! | `FC_AUXILIARY_PASSWORD` | `auxiliary.password` |
//! | `FC_DATA_DIR` | `storage.data_dir` |

use fc_01_account::GasSettings;
use serde::{Deserialize, Serialize};
use shared_types::serde_helpers::decimal_u256;
use shared_types::{Address, ChainId, U256};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file used when `FC_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "facilitator.json";

/// Configuration errors. Any of these stops the process at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {reason}")]
    Read {
        /// File path.
        path: String,
        /// I/O error.
        reason: String,
    },

    /// The file is not a valid configuration.
    #[error("cannot parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The storage backend is unknown or not compiled in.
    #[error("unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

/// Complete facilitator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitatorConfig {
    /// Display name of the origin chain.
    #[serde(default = "default_origin_chain_name")]
    pub origin_chain_name: String,
    /// Chain id identifying the auxiliary chain record.
    pub auxiliary_chain_id: ChainId,
    /// Origin chain endpoints and contracts.
    pub origin: ChainConfig,
    /// Auxiliary chain endpoints and contracts.
    pub auxiliary: ChainConfig,
    /// Token metadata of the gateway pair.
    #[serde(default)]
    pub token: TokenConfig,
    /// Event index settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Gas settings for facilitator transactions.
    #[serde(default)]
    pub transactions: TransactionConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_origin_chain_name() -> String {
    "origin".to_string()
}

/// One chain: node, index and the bridge contracts on it.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id.
    pub chain_id: ChainId,
    /// JSON-RPC endpoint of the chain node.
    pub rpc_url: String,
    /// Event index HTTP endpoint.
    pub index_http_url: String,
    /// Event index WebSocket endpoint.
    pub index_ws_url: String,
    /// Facilitator account.
    pub facilitator_address: Address,
    /// Gateway (origin) or co-gateway (auxiliary).
    pub gateway_address: Address,
    /// Anchor holding the other chain's state roots.
    pub anchor_address: Address,
    /// Stake pool (origin) or redeem pool (auxiliary).
    pub request_pool_address: Address,
    /// Keystore password of the facilitator account.
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("index_http_url", &self.index_http_url)
            .field("index_ws_url", &self.index_ws_url)
            .field("facilitator_address", &self.facilitator_address)
            .field("gateway_address", &self.gateway_address)
            .field("anchor_address", &self.anchor_address)
            .field("request_pool_address", &self.request_pool_address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens and bounties of the gateway pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Value token locked by the origin gateway.
    #[serde(default)]
    pub value_token_address: Address,
    /// Utility token minted by the co-gateway.
    #[serde(default)]
    pub utility_token_address: Address,
    /// Bounty of a stake intent.
    #[serde(default, with = "decimal_u256")]
    pub stake_bounty: U256,
    /// Bounty of a redeem intent.
    #[serde(default, with = "decimal_u256")]
    pub redeem_bounty: U256,
}

/// Event index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Records per page query.
    pub page_size: usize,
    /// Seconds between subscription restarts.
    pub restart_interval_secs: u64,
    /// Batches queued ahead of the dispatcher.
    pub dispatch_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            page_size: fc_03_event_index::DEFAULT_PAGE_SIZE,
            restart_interval_secs: 600,
            dispatch_capacity: 64,
        }
    }
}

/// Gas settings, shared by both chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Gas price in wei.
    #[serde(with = "decimal_u256")]
    pub gas_price: U256,
    /// Gas limit.
    #[serde(with = "decimal_u256")]
    pub gas_limit: U256,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        let gas = GasSettings::default();
        Self {
            gas_price: gas.gas_price,
            gas_limit: gas.gas_limit,
        }
    }
}

impl TransactionConfig {
    /// Settings handed to the transaction submitters.
    pub fn gas_settings(&self) -> GasSettings {
        GasSettings {
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `rocksdb`.
    pub backend: String,
    /// Database directory for the `rocksdb` backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl FacilitatorConfig {
    /// Parses a configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Loads the file named by `FC_CONFIG` and applies environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("FC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies overrides looked up by variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup("FC_ORIGIN_PASSWORD") {
            self.origin.password = password;
        }
        if let Some(password) = lookup("FC_AUXILIARY_PASSWORD") {
            self.auxiliary.password = password;
        }
        if let Some(dir) = lookup("FC_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    /// Checks values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.page_size == 0 {
            return Err(ConfigError::Invalid("index.page_size must be positive".into()));
        }
        if self.index.restart_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "index.restart_interval_secs must be positive".into(),
            ));
        }
        if self.origin.gateway_address == self.auxiliary.gateway_address {
            return Err(ConfigError::Invalid(
                "origin and auxiliary gateway addresses are identical".into(),
            ));
        }
        if self.origin.anchor_address == self.auxiliary.anchor_address {
            return Err(ConfigError::Invalid(
                "origin and auxiliary anchor addresses are identical".into(),
            ));
        }
        match self.storage.backend.as_str() {
            "memory" => Ok(()),
            "rocksdb" if cfg!(feature = "rocksdb") => Ok(()),
            other => Err(ConfigError::UnsupportedBackend(other.to_string())),
        }
    }
}
