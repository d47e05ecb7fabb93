//! Prometheus text endpoint.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /metrics` | current metric snapshot, text format 0.0.4 |
//! | `GET /health` | `OK` |

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::metrics::encode_metrics;
use crate::TelemetryError;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

async fn metrics() -> Response {
    match encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "Encoding metrics failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

fn build_router() -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health_check))
}

/// Serves metrics on `addr` until `shutdown` flips to `true`.
pub async fn serve_metrics(
    addr: SocketAddr,
    shutdown: watch::Receiver<bool>,
) -> Result<(), TelemetryError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TelemetryError::Endpoint(e.to_string()))?;
    info!(%addr, "Metrics endpoint listening");
    serve_on(listener, shutdown).await
}

async fn serve_on(
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), TelemetryError> {
    axum::serve(listener, build_router())
        .with_graceful_shutdown(async move {
            // A dropped sender stops the endpoint too.
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .map_err(|e| TelemetryError::Endpoint(e.to_string()))?;
    info!("Metrics endpoint stopped");
    Ok(())
}
