//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the popcorn server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Watched list size (collected dynamically)
//! - Core metrics (search, detail, storage) registered from `popcorn_core`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
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
            "popcorn_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("popcorn_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "popcorn_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Application Metrics
// =============================================================================

/// Entries in the watched list (collected dynamically).
pub static WATCHED_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "popcorn_watched_entries",
        "Current number of watched list entries",
    )
    .unwrap()
});

/// Whether a movie detail view is open (collected dynamically).
pub static DETAIL_OPEN: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("popcorn_detail_open", "1 while a movie detail view is open").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Application
    registry
        .register(Box::new(WATCHED_ENTRIES.clone()))
        .unwrap();
    registry.register(Box::new(DETAIL_OPEN.clone())).unwrap();

    // Core metrics (search, detail, storage)
    for metric in popcorn_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges from the latest
/// published snapshot.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let snapshot = state.app().snapshot();
    WATCHED_ENTRIES.set(snapshot.watched.entries.len() as i64);
    DETAIL_OPEN.set(if snapshot.selection.is_selected() { 1 } else { 0 });
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Catalog ids ("tt0372784") and bare numbers
    let catalog_id_regex = regex_lite::Regex::new(r"/tt\d+(/|$)").unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = catalog_id_regex.replace_all(path, "/{id}$1");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
