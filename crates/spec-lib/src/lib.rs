//! Pod spec library for container resource recommendation
//!
//! This crate provides:
//! - Basic pod/container spec models
//! - Resource quantity conversion
//! - Pod listing and normalization
//! - Prometheus metrics for spec fetches

pub mod models;
pub mod observability;
pub mod quantity;
pub mod spec;

pub use models::*;
pub use observability::SpecMetrics;
pub use spec::{DefaultSpecClient, ListError, PodLister, Selector, SpecClient};
