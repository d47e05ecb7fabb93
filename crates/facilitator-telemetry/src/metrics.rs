//! Prometheus metrics for the facilitator.
//!
//! All metrics follow the naming convention: `fc_<component>_<metric>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT INDEX
    // =========================================================================

    /// Raw records decoded from the event index
    pub static ref RECORDS_FETCHED: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_index_records_fetched_total", "Records fetched from the event index"),
        &["kind"]
    ).expect("metric creation failed");

    /// Sweeps by outcome (committed, empty, failed)
    pub static ref SWEEPS: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_index_sweeps_total", "Completed or aborted paginated sweeps"),
        &["kind", "outcome"]
    ).expect("metric creation failed");

    /// Last committed uts cursor per kind
    pub static ref CURSOR_UTS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("fc_index_cursor_uts", "Committed index cursor per entity kind"),
        &["kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // DISPATCHER
    // =========================================================================

    /// Records folded into storage by handlers
    pub static ref RECORDS_HANDLED: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_dispatch_records_handled_total", "Records applied by contract entity handlers"),
        &["kind"]
    ).expect("metric creation failed");

    /// Handler failures
    pub static ref DISPATCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_dispatch_failures_total", "Handler failures per entity kind"),
        &["kind"]
    ).expect("metric creation failed");

    /// Observer failures during notification passes
    pub static ref OBSERVER_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_observer_failures_total", "Observer update failures"),
        &["observer"]
    ).expect("metric creation failed");

    // =========================================================================
    // SERVICES
    // =========================================================================

    /// Transactions sent by the facilitator accounts
    pub static ref TRANSACTIONS_SUBMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_transactions_submitted_total", "Transactions submitted per call and outcome"),
        &["call", "outcome"]
    ).expect("metric creation failed");

    /// Outbox proofs requested from the proof generator
    pub static ref PROOFS_REQUESTED: IntCounter = IntCounter::new(
        "fc_proofs_requested_total",
        "Outbox proofs requested"
    ).expect("metric creation failed");
}

/// Registers every metric with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Event index
        Box::new(RECORDS_FETCHED.clone()),
        Box::new(SWEEPS.clone()),
        Box::new(CURSOR_UTS.clone()),
        // Dispatcher
        Box::new(RECORDS_HANDLED.clone()),
        Box::new(DISPATCH_FAILURES.clone()),
        Box::new(OBSERVER_FAILURES.clone()),
        // Services
        Box::new(TRANSACTIONS_SUBMITTED.clone()),
        Box::new(PROOFS_REQUESTED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
