//! Basic pod and container specs
//!
//! This module provides:
//! - Pod listing sources (reflector cache, live API)
//! - Normalization of pods into basic pod/container specs
//! - Requested resource calculation
//! - The spec client tying them together

mod client;
mod lister;
mod normalize;


pub use client::{DefaultSpecClient, SpecClient};
pub use lister::{ListError, PodLister, Selector};
pub use normalize::{calculate_requested_resources, new_basic_pod_spec, new_container_spec};
