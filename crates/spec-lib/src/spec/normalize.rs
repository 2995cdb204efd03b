//! Pod and container normalization

use crate::models::{
    BasicContainerSpec, BasicPodSpec, ContainerId, CurrentState, PodId, PodPhase, ResourceName,
    Resources,
};
use crate::quantity::QuantityExt;
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod};
use std::collections::HashMap;

/// Build the basic spec of a pod
pub fn new_basic_pod_spec(pod: &Pod) -> BasicPodSpec {
    let id = PodId::new(
        pod.metadata.namespace.clone().unwrap_or_default(),
        pod.metadata.name.clone().unwrap_or_default(),
    );

    let statuses = ContainerStatusIndex::new(pod);
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .map(|container| container_spec(&id, &statuses, container))
                .collect()
        })
        .unwrap_or_default();

    BasicPodSpec {
        id,
        pod_labels: pod.metadata.labels.clone().unwrap_or_default(),
        containers,
        phase: PodPhase::from_reported(pod.status.as_ref().and_then(|s| s.phase.as_deref())),
    }
}

/// Build the basic spec of one container declared in `pod`
pub fn new_container_spec(pod_id: &PodId, pod: &Pod, container: &Container) -> BasicContainerSpec {
    container_spec(pod_id, &ContainerStatusIndex::new(pod), container)
}

fn container_spec(
    pod_id: &PodId,
    statuses: &ContainerStatusIndex<'_>,
    container: &Container,
) -> BasicContainerSpec {
    let mut spec = BasicContainerSpec {
        id: ContainerId::new(pod_id.clone(), container.name.clone()),
        image: container.image.clone().unwrap_or_default(),
        request: calculate_requested_resources(container),
        ..Default::default()
    };

    if let Some(status) = statuses.get(&container.name) {
        spec.restart_count = u32::try_from(status.restart_count).unwrap_or_default();
        spec.ready = status.ready;
        spec.current_state = current_state(status);
    }

    spec
}

fn current_state(status: &ContainerStatus) -> CurrentState {
    let reason = status
        .state
        .as_ref()
        .and_then(|state| state.waiting.as_ref())
        .and_then(|waiting| waiting.reason.clone())
        .unwrap_or_default();
    CurrentState { reason }
}

/// Container statuses of a pod keyed by container name.
///
/// Built in status list order, so when several entries share a name the
/// last one is kept.
struct ContainerStatusIndex<'a> {
    by_name: HashMap<&'a str, &'a ContainerStatus>,
}

impl<'a> ContainerStatusIndex<'a> {
    fn new(pod: &'a Pod) -> Self {
        let by_name = pod
            .status
            .iter()
            .flat_map(|status| status.container_statuses.iter().flatten())
            .map(|status| (status.name.as_str(), status))
            .collect();
        Self { by_name }
    }

    fn get(&self, name: &str) -> Option<&'a ContainerStatus> {
        self.by_name.get(name).copied()
    }
}

/// Requested CPU (milli-cores) and memory (bytes) of a container.
/// Limits are not considered.
pub fn calculate_requested_resources(container: &Container) -> Resources {
    let requests = container
        .resources
        .as_ref()
        .and_then(|r| r.requests.as_ref());
    let request = |name: ResourceName| requests.and_then(|r| r.get(name.as_str()));

    Resources {
        cpu: request(ResourceName::Cpu)
            .map(|q| q.milli_value())
            .unwrap_or_default(),
        memory: request(ResourceName::Memory)
            .map(|q| q.value())
            .unwrap_or_default(),
    }
}
