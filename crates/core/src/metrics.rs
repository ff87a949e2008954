//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Probing (per-backend failures, files probed)
//! - Recompute passes (results, duration)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Probe Metrics
// =============================================================================

/// Probe attempts that produced no tracks, by backend.
pub static PROBE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hsorter_probe_failures_total",
            "Probe attempts that yielded no tracks",
        ),
        &["backend"],
    )
    .expect("valid metric definition")
});

/// Video files run through the feature extractor.
pub static FILES_PROBED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hsorter_files_probed_total",
        "Total video files probed during recompute",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Recompute Metrics
// =============================================================================

/// Recompute passes by result.
pub static RECOMPUTE_PASSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hsorter_recompute_passes_total", "Total recompute passes"),
        &["result"], // "completed", "failed", "cancelled"
    )
    .expect("valid metric definition")
});

/// Recompute pass duration in seconds.
pub static RECOMPUTE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hsorter_recompute_duration_seconds",
            "Duration of recompute passes",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
        &["result"],
    )
    .expect("valid metric definition")
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROBE_FAILURES.clone()),
        Box::new(FILES_PROBED.clone()),
        Box::new(RECOMPUTE_PASSES.clone()),
        Box::new(RECOMPUTE_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        RECOMPUTE_PASSES.with_label_values(&["completed"]).inc();
        PROBE_FAILURES.with_label_values(&["ffprobe"]).inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|m| m.get_name().to_string())
            .collect();
        assert!(names.contains(&"hsorter_recompute_passes_total".to_string()));
        assert!(names.contains(&"hsorter_probe_failures_total".to_string()));
    }
}
