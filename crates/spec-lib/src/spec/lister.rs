//! Pod listing sources
//!
//! The spec client only needs "list every pod". Anything that can answer
//! that (a reflector cache, the live API, a test fixture)
//! implements [`PodLister`].

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::runtime::reflector::Store;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors returned by a pod listing source
#[derive(Debug, Error)]
pub enum ListError {
    #[error("kubernetes API error: {0}")]
    Api(#[from] kube::Error),
    #[error("pod source unavailable: {0}")]
    Unavailable(String),
}

/// Pod selector. Only the match-everything selector exists; listers
/// return every pod they know of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selector {
    _private: (),
}

impl Selector {
    /// Selector matching every pod
    pub fn everything() -> Self {
        Self::default()
    }
}

/// Source of pod objects
#[async_trait]
pub trait PodLister: Send + Sync {
    /// List all pods matching the selector
    async fn list(&self, selector: &Selector) -> Result<Vec<Arc<Pod>>, ListError>;
}

/// Snapshot of a reflector cache. Never fails.
#[async_trait]
impl PodLister for Store<Pod> {
    async fn list(&self, _selector: &Selector) -> Result<Vec<Arc<Pod>>, ListError> {
        let pods = self.state();
        debug!(count = pods.len(), "Listed pods from cache");
        Ok(pods)
    }
}

/// Live list against the API server
#[async_trait]
impl PodLister for Api<Pod> {
    async fn list(&self, _selector: &Selector) -> Result<Vec<Arc<Pod>>, ListError> {
        let pods = Api::list(self, &ListParams::default()).await?;
        debug!(count = pods.items.len(), "Listed pods from API server");
        Ok(pods.items.into_iter().map(Arc::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::runtime::{reflector, watcher};

    fn labelled_pod(name: &str, labels: &[(&str, &str)]) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_store_lister_returns_every_pod() {
        let (reader, mut writer) = reflector::store::<Pod>();
        writer.apply_watcher_event(&watcher::Event::Restarted(vec![
            labelled_pod("web-1", &[("app", "web")]),
            labelled_pod("db-1", &[("app", "db")]),
        ]));

        let mut names: Vec<_> = reader
            .list(&Selector::everything())
            .await
            .unwrap()
            .iter()
            .filter_map(|pod| pod.metadata.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["db-1", "web-1"]);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (reader, _writer) = reflector::store::<Pod>();
        assert!(reader.list(&Selector::everything()).await.unwrap().is_empty());
    }
}
