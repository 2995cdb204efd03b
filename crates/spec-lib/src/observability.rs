//! Observability for the spec client
//!
//! Prometheus metrics for pod spec fetches, registered once in the
//! default registry.

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for fetch latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

static GLOBAL_METRICS: OnceLock<SpecMetricsInner> = OnceLock::new();

struct SpecMetricsInner {
    fetch_latency_seconds: Histogram,
    pods_normalized: IntGauge,
    containers_normalized: IntGauge,
    listing_errors: IntCounter,
}

impl SpecMetricsInner {
    fn new() -> Self {
        Self {
            fetch_latency_seconds: register_histogram!(
                "spec_client_fetch_latency_seconds",
                "Time spent listing and normalizing pod specs",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register fetch_latency_seconds"),

            pods_normalized: register_int_gauge!(
                "spec_client_pods_normalized",
                "Number of pods in the last pod spec snapshot"
            )
            .expect("Failed to register pods_normalized"),

            containers_normalized: register_int_gauge!(
                "spec_client_containers_normalized",
                "Number of containers in the last pod spec snapshot"
            )
            .expect("Failed to register containers_normalized"),

            listing_errors: register_int_counter!(
                "spec_client_listing_errors_total",
                "Total number of failed pod listings"
            )
            .expect("Failed to register listing_errors"),
        }
    }
}

/// Handle to the global spec client metrics.
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct SpecMetrics {
    _private: (),
}

impl Default for SpecMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SpecMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SpecMetricsInner {
        GLOBAL_METRICS.get_or_init(SpecMetricsInner::new)
    }

    pub fn observe_fetch_latency(&self, duration_secs: f64) {
        self.inner().fetch_latency_seconds.observe(duration_secs);
    }

    /// Record the size of a successful snapshot
    pub fn set_snapshot_size(&self, pods: i64, containers: i64) {
        self.inner().pods_normalized.set(pods);
        self.inner().containers_normalized.set(containers);
    }

    pub fn inc_listing_errors(&self) {
        self.inner().listing_errors.inc();
    }

    pub fn listing_errors(&self) -> u64 {
        self.inner().listing_errors.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_metrics_shared_between_handles() {
        let metrics = SpecMetrics::new();
        let other = metrics.clone();

        metrics.observe_fetch_latency(0.002);
        metrics.set_snapshot_size(3, 7);

        let before = other.listing_errors();
        metrics.inc_listing_errors();
        assert!(other.listing_errors() > before);
    }
}
