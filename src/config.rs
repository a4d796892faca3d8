// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::rbac::DEFAULT_CLUSTER_ROLE;
use crate::sync::SyncPolicy;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string of the system of record; only commands that touch it need one
    pub database_url: Option<String>,
    /// Explicit kubeconfig; when unset the client is inferred
    pub kubeconfig: Option<PathBuf>,
    /// API server URL written into tenant kubeconfigs, defaults to the one kennel connects to
    pub cluster_endpoint: Option<String>,
    /// Pre-existing cluster role bound by `ensure_cluster_binding`
    pub cluster_role: String,
    pub sync_policy: SyncPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL");

        let kubeconfig = lookup("KENNEL_KUBECONFIG").map(PathBuf::from);

        let cluster_endpoint = match lookup("CLUSTER_ENDPOINT") {
            Some(endpoint) => {
                let parsed = url::Url::parse(&endpoint)
                    .with_context(|| format!("CLUSTER_ENDPOINT '{}' is not a valid URL", endpoint))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    bail!("CLUSTER_ENDPOINT '{}' must use http or https", endpoint);
                }
                Some(endpoint.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let cluster_role =
            lookup("CLUSTER_ROLE").unwrap_or_else(|| DEFAULT_CLUSTER_ROLE.to_string());

        let sync_policy = match lookup("SYNC_POLICY") {
            Some(policy) => policy.parse()?,
            None => SyncPolicy::default(),
        };

        Ok(Config {
            database_url,
            kubeconfig,
            cluster_endpoint,
            cluster_role,
            sync_policy,
        })
    }

    /// Connection string of the system of record, required by commands that read or write it
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL environment variable not set")
    }
}
