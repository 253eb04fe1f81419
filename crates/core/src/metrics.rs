//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search pipeline (requests, outcomes, stale responses)
//! - Detail fetches
//! - Watched list mutations and storage failures

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Requests
// =============================================================================

/// Search requests issued to the catalog.
pub static SEARCH_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "popcorn_search_requests_total",
        "Total search requests issued to the catalog",
    )
    .unwrap()
});

/// Settled search requests by outcome.
pub static SEARCH_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_search_results_total",
            "Settled search requests by outcome",
        ),
        &["result"], // "ok", "not_found", "failed"
    )
    .unwrap()
});

/// Detail fetches by outcome.
pub static DETAIL_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("popcorn_detail_fetches_total", "Detail fetches by outcome"),
        &["result"], // "ok", "not_found", "failed"
    )
    .unwrap()
});

/// Requests abandoned before they settled.
pub static REQUESTS_CANCELLED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_requests_cancelled_total",
            "Catalog requests cancelled before settling",
        ),
        &["component"], // "search", "detail"
    )
    .unwrap()
});

/// Responses that arrived for a superseded query or selection.
pub static STALE_RESPONSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_stale_responses_total",
            "Responses discarded because a newer request replaced them",
        ),
        &["component"],
    )
    .unwrap()
});

// =============================================================================
// Watched List
// =============================================================================

/// Watched list mutations.
pub static WATCHED_MUTATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_watched_mutations_total",
            "Watched list mutations",
        ),
        &["op"], // "add", "delete", "rejected"
    )
    .unwrap()
});

/// Storage reads/writes that failed and were degraded.
pub static STORAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_storage_failures_total",
            "Durable storage failures (degraded to defaults/no-ops)",
        ),
        &["op"], // "open", "load", "save"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(DETAIL_FETCHES.clone()),
        Box::new(REQUESTS_CANCELLED.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(WATCHED_MUTATIONS.clone()),
        Box::new(STORAGE_FAILURES.clone()),
    ]
}
