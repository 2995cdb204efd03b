//! Agent configuration

use anyhow::Result;
use serde::Deserialize;

/// Where pods are listed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListerSource {
    /// Reflector cache, synced before listing
    #[default]
    Cache,
    /// Direct list call against the API server
    Api,
}

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SpecAgentConfig {
    /// Namespace to list pods from; empty means all namespaces
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub source: ListerSource,

    /// Pretty-print the JSON snapshot
    #[serde(default)]
    pub pretty: bool,
}

impl SpecAgentConfig {
    /// Load configuration from `SPEC_AGENT_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SPEC_AGENT"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: SpecAgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.namespace, "");
        assert_eq!(config.source, ListerSource::Cache);
        assert!(!config.pretty);
    }

    #[test]
    fn test_api_source() {
        let config: SpecAgentConfig =
            serde_json::from_str(r#"{"namespace": "kube-system", "source": "api"}"#).unwrap();
        assert_eq!(config.namespace, "kube-system");
        assert_eq!(config.source, ListerSource::Api);
    }
}
