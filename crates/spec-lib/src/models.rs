//! Core data models for normalized pod and container specs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Identifies a pod within a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PodId {
    pub namespace: String,
    pub pod_name: String,
}

impl PodId {
    pub fn new(namespace: impl Into<String>, pod_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            pod_name: pod_name.into(),
        }
    }
}

impl fmt::Display for PodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.pod_name)
    }
}

/// Identifies a container within a pod
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId {
    pub pod_id: PodId,
    pub container_name: String,
}

impl ContainerId {
    pub fn new(pod_id: PodId, container_name: impl Into<String>) -> Self {
        Self {
            pod_id,
            container_name: container_name.into(),
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pod_id, self.container_name)
    }
}

/// Resource kinds tracked per container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceName {
    /// Milli-cores
    Cpu,
    /// Bytes
    Memory,
}

impl ResourceName {
    pub const ALL: [ResourceName; 2] = [ResourceName::Cpu, ResourceName::Memory];

    /// Key used for this resource in a container's requests map
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceName::Cpu => "cpu",
            ResourceName::Memory => "memory",
        }
    }
}

/// Amount of a resource (milli-cores for CPU, bytes for memory)
pub type ResourceAmount = i64;

/// Requested resources of a container.
///
/// Both CPU and memory are always present; a resource without a declared
/// request is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub cpu: ResourceAmount,
    pub memory: ResourceAmount,
}

impl Resources {
    pub fn new(cpu: ResourceAmount, memory: ResourceAmount) -> Self {
        Self { cpu, memory }
    }

    pub fn get(&self, name: ResourceName) -> ResourceAmount {
        self[name]
    }

    /// Iterate over (resource, amount) pairs
    pub fn iter(&self) -> impl Iterator<Item = (ResourceName, ResourceAmount)> + '_ {
        ResourceName::ALL.into_iter().map(move |name| (name, self[name]))
    }
}

impl Index<ResourceName> for Resources {
    type Output = ResourceAmount;

    fn index(&self, name: ResourceName) -> &Self::Output {
        match name {
            ResourceName::Cpu => &self.cpu,
            ResourceName::Memory => &self.memory,
        }
    }
}

/// Pod lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    Unknown,
}

impl PodPhase {
    /// Map the phase string reported by the API server.
    /// Missing or unrecognised phases map to `Unknown`.
    pub fn from_reported(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Simplified runtime state of a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrentState {
    /// Waiting reason; empty when the container is running, terminated,
    /// or waiting without a reported reason
    pub reason: String,
}

/// Basic information defining a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicContainerSpec {
    pub id: ContainerId,
    pub image: String,
    /// Currently requested resources
    pub request: Resources,
    pub restart_count: u32,
    pub ready: bool,
    pub current_state: CurrentState,
}

/// Basic information defining a pod and its containers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicPodSpec {
    pub id: PodId,
    pub pod_labels: BTreeMap<String, String>,
    /// Containers in pod spec declaration order
    pub containers: Vec<BasicContainerSpec>,
    pub phase: PodPhase,
}
