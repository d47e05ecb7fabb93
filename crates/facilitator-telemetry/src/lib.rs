//! # Facilitator Telemetry
//!
//! Logging and metrics shared by every facilitator crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use facilitator_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_SERVICE_NAME` | `facilitator` | Service name in log lines |
//! | `FC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FC_JSON_LOGS` | `false` | JSON formatted logs |
//! | `FC_METRICS_PORT` | unset | Port of the Prometheus text endpoint |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;
mod server;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics};
pub use server::serve_metrics;

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Registering or encoding metrics failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The metrics endpoint could not be served.
    #[error("Metrics endpoint error: {0}")]
    Endpoint(String),
}

/// Installs the log subscriber and registers all metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;
    register_metrics()?;
    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        metrics_port = ?config.metrics_port,
        "Telemetry initialized"
    );
    Ok(())
}
