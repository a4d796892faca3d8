// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One-shot repair of drift between the system of record and the cluster

use crate::error::{KennelError, Result};
use crate::kubernetes::ClusterGateway;
use crate::naming::ManagedLabels;
use crate::provision::NamespaceProvisioner;
use crate::store::NamespaceStore;
use crate::sync::NamespaceDiff;
use crate::types::ClusterNamespace;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// What to do when repairing one namespace fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Repair every namespace, then report all failures together
    #[default]
    ContinueOnError,
    /// Stop at the first failure and return it
    AbortOnFirstError,
}

#[derive(Debug, Error)]
#[error("Unknown sync policy '{0}', expected 'continue' or 'abort'")]
pub struct ParseSyncPolicyError(String);

impl FromStr for SyncPolicy {
    type Err = ParseSyncPolicyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(SyncPolicy::ContinueOnError),
            "abort" => Ok(SyncPolicy::AbortOnFirstError),
            other => Err(ParseSyncPolicyError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Delete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create => f.write_str("create"),
            SyncAction::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug)]
pub struct SyncFailure {
    pub namespace: String,
    pub action: SyncAction,
    pub error: KennelError,
}

/// Outcome of a sync pass
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Namespaces whose cluster objects were recreated
    pub created: Vec<String>,
    /// Orphaned cluster namespaces that were deleted
    pub deleted: Vec<String>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ReconciliationEngine {
    gateway: ClusterGateway,
    store: Arc<dyn NamespaceStore>,
    provisioner: NamespaceProvisioner,
    policy: SyncPolicy,
}

impl ReconciliationEngine {
    pub fn new(
        gateway: ClusterGateway,
        store: Arc<dyn NamespaceStore>,
        provisioner: NamespaceProvisioner,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            gateway,
            store,
            provisioner,
            policy,
        }
    }

    /// Compare recorded namespaces with the managed namespaces in the cluster
    #[instrument(skip(self))]
    pub async fn diff(&self) -> Result<NamespaceDiff> {
        let records = self.store.list().await?;
        let cluster: Vec<ClusterNamespace> = self
            .gateway
            .list_namespaces(&ManagedLabels::selector())
            .await?
            .iter()
            .map(ClusterNamespace::from)
            .collect();

        let diff = NamespaceDiff::between(records, cluster);
        info!(
            "{} namespace(s) missing from cluster, {} missing from database",
            diff.missing_from_cluster.len(),
            diff.missing_from_database.len()
        );
        Ok(diff)
    }

    /// Recreate missing cluster objects, then delete orphaned namespaces
    #[instrument(skip(self, diff))]
    pub async fn sync(&self, diff: &NamespaceDiff) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for record in &diff.missing_from_cluster {
            let name = record.name.to_string();
            match self
                .provisioner
                .provision_cluster_objects(&record.name, record.owner_id)
                .await
            {
                Ok(()) => {
                    info!("Recreated cluster objects for {}", name);
                    report.created.push(name);
                }
                Err(e) => self.fail(&mut report, name, SyncAction::Create, e)?,
            }
        }

        for orphan in &diff.missing_from_database {
            match self.delete_orphan(orphan).await {
                Ok(()) => report.deleted.push(orphan.name.clone()),
                Err(e) => self.fail(&mut report, orphan.name.clone(), SyncAction::Delete, e)?,
            }
        }

        if report.is_success() {
            Ok(report)
        } else {
            Err(KennelError::SyncFailed(Box::new(report)))
        }
    }

    /// `diff` followed by `sync`
    pub async fn reconcile(&self) -> Result<SyncReport> {
        let diff = self.diff().await?;
        if diff.is_empty() {
            debug!("Database and cluster agree");
            return Ok(SyncReport::default());
        }
        self.sync(&diff).await
    }

    async fn delete_orphan(&self, orphan: &ClusterNamespace) -> Result<()> {
        match self.gateway.delete_namespace(&orphan.name).await {
            Err(e) if e.is_not_found() => {
                debug!("Namespace {} already gone", orphan.name);
                Ok(())
            }
            other => other,
        }
    }

    fn fail(
        &self,
        report: &mut SyncReport,
        namespace: String,
        action: SyncAction,
        error: KennelError,
    ) -> Result<()> {
        if self.policy == SyncPolicy::AbortOnFirstError {
            return Err(error);
        }

        warn!("Failed to {} namespace {}: {}", action, namespace, error);
        report.failures.push(SyncFailure {
            namespace,
            action,
            error,
        });
        Ok(())
    }
}
