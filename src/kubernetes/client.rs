// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation and kubeconfig utilities

use crate::config::Config;
use crate::error::{KennelError, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config as KConfig,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// A connected client together with the API server URL it talks to
pub struct ClusterConnection {
    pub client: Client,
    pub endpoint: String,
}

/// Connect to the cluster described by the configuration.
///
/// An explicit kubeconfig path wins; otherwise the in-cluster service account
/// or `$KUBECONFIG` is used. `CLUSTER_ENDPOINT` overrides the endpoint written
/// into tenant kubeconfigs without changing where kennel itself connects.
#[instrument(skip(config))]
pub async fn connect(config: &Config) -> Result<ClusterConnection> {
    let client_config = match &config.kubeconfig {
        Some(path) => load_kubeconfig_file(path).await?,
        None => KConfig::infer()
            .await
            .map_err(|e| KennelError::KubeconfigError(format!("Failed to infer config: {}", e)))?,
    };

    let endpoint = config
        .cluster_endpoint
        .clone()
        .unwrap_or_else(|| normalize_endpoint(&client_config.cluster_url.to_string()));
    debug!("Tenant kubeconfigs will point at {}", endpoint);

    let client = Client::try_from(client_config)
        .map_err(|e| KennelError::KubeconfigError(format!("Failed to create client: {}", e)))?;
    info!("Connected to Kubernetes cluster");

    Ok(ClusterConnection { client, endpoint })
}

async fn load_kubeconfig_file(path: &Path) -> Result<KConfig> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        KennelError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    config_from_kubeconfig(&contents).await
}

/// Create a client configuration from a kubeconfig string
pub async fn config_from_kubeconfig(kubeconfig: &str) -> Result<KConfig> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| KennelError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| KennelError::KubeconfigError(format!("Failed to create config: {}", e)))
}

/// `http::Uri` renders a bare authority with a trailing slash
fn normalize_endpoint(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
