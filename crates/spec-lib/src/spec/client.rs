//! Spec client: fetches pods and returns their basic specs

use super::lister::{ListError, PodLister, Selector};
use super::normalize::new_basic_pod_spec;
use crate::models::BasicPodSpec;
use crate::observability::SpecMetrics;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

/// Provides basic information about pod and container specs
#[async_trait]
pub trait SpecClient: Send + Sync {
    /// Returns a [`BasicPodSpec`] for each pod in the cluster
    async fn get_pod_specs(&self) -> Result<Vec<BasicPodSpec>, ListError>;
}

/// [`SpecClient`] backed by a [`PodLister`]
pub struct DefaultSpecClient<L> {
    pod_lister: L,
    metrics: SpecMetrics,
}

impl<L: PodLister> DefaultSpecClient<L> {
    pub fn new(pod_lister: L) -> Self {
        Self {
            pod_lister,
            metrics: SpecMetrics::new(),
        }
    }
}

#[async_trait]
impl<L: PodLister> SpecClient for DefaultSpecClient<L> {
    async fn get_pod_specs(&self) -> Result<Vec<BasicPodSpec>, ListError> {
        let start = Instant::now();

        let pods = match self.pod_lister.list(&Selector::everything()).await {
            Ok(pods) => pods,
            Err(e) => {
                warn!(event = "pod_listing_failed", error = %e, "Failed to list pods");
                self.metrics.inc_listing_errors();
                return Err(e);
            }
        };

        let specs: Vec<BasicPodSpec> = pods.iter().map(|pod| new_basic_pod_spec(pod)).collect();

        let containers: usize = specs.iter().map(|s| s.containers.len()).sum();
        self.metrics
            .set_snapshot_size(specs.len() as i64, containers as i64);
        self.metrics.observe_fetch_latency(start.elapsed().as_secs_f64());
        debug!(
            event = "pod_specs_fetched",
            pods = specs.len(),
            containers = containers,
            "Fetched pod specs"
        );

        Ok(specs)
    }
}
