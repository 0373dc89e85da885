//! Prometheus metrics for the gateway.
//!
//! NOTE: We intentionally avoid agent/user/run identifiers in metric labels
//! to prevent high-cardinality explosion that can crash Prometheus.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "engram_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("engram_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Engine call metrics
    // ============================================================================

    /// Engine call duration per operation
    pub static ref ENGINE_CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "engram_engine_call_duration_seconds",
            "Engine call duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"]
    ).unwrap();

    /// Engine calls by operation and result
    pub static ref ENGINE_CALLS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("engram_engine_calls_total", "Total engine calls"),
        &["operation", "result"]
    ).unwrap();

    /// Results returned per retrieval call
    pub static ref ENGINE_RESULTS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "engram_engine_results",
            "Number of results returned per retrieval call"
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["operation"]
    ).unwrap();

    // ============================================================================
    // Error metrics
    // ============================================================================

    /// Total errors by type and endpoint
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("engram_errors_total", "Total errors by type"),
        &["error_type", "endpoint"]
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(ENGINE_CALL_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(ENGINE_CALLS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(ENGINE_RESULTS.clone()))?;
    METRICS_REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;
    Ok(())
}
