//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the hsorter server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Recompute status and cache size (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hsorter_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hsorter_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hsorter_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid metric definition")
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hsorter_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .expect("valid metric definition")
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hsorter_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .expect("valid metric definition")
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hsorter_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .expect("valid metric definition")
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hsorter_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Recompute Metrics
// =============================================================================

/// Whether a recompute pass is running (collected dynamically).
pub static RECOMPUTE_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hsorter_recompute_running",
        "Whether a recompute pass is running (1 = yes)",
    )
    .expect("valid metric definition")
});

/// Cache partitions holding data (collected dynamically).
pub static CACHE_PARTITIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hsorter_cache_partitions",
        "Number of statistics cache partitions holding data",
    )
    .expect("valid metric definition")
});

/// Register all metrics with the registry.
fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // WebSocket
        Box::new(WS_CONNECTIONS_ACTIVE.clone()),
        Box::new(WS_CONNECTIONS_TOTAL.clone()),
        Box::new(WS_MESSAGES_SENT.clone()),
        Box::new(WS_LAG_EVENTS.clone()),
        // Recompute
        Box::new(RECOMPUTE_RUNNING.clone()),
        Box::new(CACHE_PARTITIONS.clone()),
    ];

    // Core metrics (probing, recompute passes)
    for metric in server_metrics
        .into_iter()
        .chain(hsorter_core::metrics::all_metrics())
    {
        if let Err(e) = registry.register(metric) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the current recompute status and
/// cache contents.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.recompute().status().await;
    RECOMPUTE_RUNNING.set(if status.is_running() { 1 } else { 0 });

    if let Ok(partitions) = state.cache().partitions() {
        CACHE_PARTITIONS.set(partitions.len() as i64);
    }
}
