//! Facilitator executable.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics from `FC_*` variables
//! 2. Load `FC_CONFIG` (default `facilitator.json`) and apply overrides
//! 3. Open the configured store
//! 4. Connect both chains and start the facilitator
//! 5. Run until Ctrl+C or SIGTERM, then shut down gracefully

use std::net::SocketAddr;

use anyhow::{Context, Result};
use facilitator_runtime::adapters::open_store;
use facilitator_runtime::{ChainPorts, Facilitator, FacilitatorConfig};
use facilitator_telemetry::{init_telemetry, serve_metrics, TelemetryConfig};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry)?;

    let (metrics_shutdown, metrics_rx) = watch::channel(false);
    let metrics = telemetry.metrics_port.map(|port| {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(addr, metrics_rx).await {
                error!(error = %e, "Metrics endpoint stopped");
            }
        })
    });

    let config = FacilitatorConfig::from_env().context("failed to load configuration")?;
    config.validate()?;
    info!(?config, "Configuration loaded");

    let store = open_store(&config.storage)?;
    let origin = ChainPorts::connect(&config.origin);
    let auxiliary = ChainPorts::connect(&config.auxiliary);

    let facilitator = Facilitator::new(config, store, origin, auxiliary);
    if let Err(e) = facilitator.start().await {
        error!(error = %e, "Startup failed");
        facilitator.stop().await;
        return Err(e);
    }

    info!("Facilitator is running. Press Ctrl+C to stop.");
    wait_for_signal().await?;

    facilitator.stop().await;
    metrics_shutdown.send_replace(true);
    if let Some(task) = metrics {
        let _ = task.await;
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
