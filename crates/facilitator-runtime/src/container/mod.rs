//! # Subsystem Container
//!
//! Configuration plus the shared instances built from it.

pub mod config;
pub mod subsystems;

pub use config::{
    ChainConfig, ConfigError, FacilitatorConfig, IndexConfig, StorageConfig, TokenConfig,
    TransactionConfig, DEFAULT_CONFIG_PATH,
};
pub use subsystems::{ChainPorts, ChainSubsystems, SubsystemContainer};
