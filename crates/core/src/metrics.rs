//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Transform operations (counts by result, durations)
//! - Bytes flowing in and out of each transform

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Transform Metrics
// =============================================================================

/// Transform operations total by operation and result.
pub static TRANSFORMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fil_transforms_total", "Total transform operations"),
        &["operation", "result"], // result: "success", "rejected", "failed"
    )
    .unwrap()
});

/// Transform duration in seconds.
pub static TRANSFORM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fil_transform_duration_seconds",
            "Duration of transform operations",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

/// Payload sizes handled by transforms.
pub static TRANSFORM_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("fil_transform_bytes", "Size of transform inputs and outputs")
            .buckets(prometheus::exponential_buckets(1024.0, 4.0, 10).unwrap()),
        &["operation", "direction"], // direction: "in", "out"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TRANSFORMS_TOTAL.clone()),
        Box::new(TRANSFORM_DURATION.clone()),
        Box::new(TRANSFORM_BYTES.clone()),
    ]
}
