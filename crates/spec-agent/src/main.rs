//! Spec agent - pod spec snapshot
//!
//! Lists the pods of a cluster, normalizes them into basic pod specs
//! and writes the snapshot to stdout as JSON.

use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client};
use spec_lib::{DefaultSpecClient, SpecClient};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{ListerSource, SpecAgentConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the snapshot
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = SpecAgentConfig::load()?;
    info!(namespace = %config.namespace, source = ?config.source, "Starting spec-agent");

    let client = Client::try_default().await?;
    let pods: Api<Pod> = if config.namespace.is_empty() {
        Api::all(client)
    } else {
        Api::namespaced(client, &config.namespace)
    };

    let specs = match config.source {
        ListerSource::Api => DefaultSpecClient::new(pods).get_pod_specs().await?,
        ListerSource::Cache => {
            let store = start_pod_cache(pods).await?;
            DefaultSpecClient::new(store).get_pod_specs().await?
        }
    };
    info!(pods = specs.len(), "Pod specs collected");

    let output = if config.pretty {
        serde_json::to_string_pretty(&specs)?
    } else {
        serde_json::to_string(&specs)?
    };
    println!("{}", output);

    Ok(())
}

/// Run a pod reflector in the background and wait for its first sync
async fn start_pod_cache(pods: Api<Pod>) -> Result<Store<Pod>> {
    let (reader, writer) = reflector::store();
    let stream = reflector::reflector(writer, watcher(pods, watcher::Config::default()))
        .applied_objects();

    tokio::spawn(stream.for_each(|event| {
        if let Err(e) = event {
            warn!(error = %e, "Pod watch error");
        }
        futures::future::ready(())
    }));

    reader.wait_until_ready().await?;
    info!(cached = reader.state().len(), "Pod cache synced");
    Ok(reader)
}
