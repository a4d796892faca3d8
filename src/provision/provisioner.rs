// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ordered creation of a tenant namespace and its access-control objects

use crate::error::{KennelError, Result};
use crate::kubernetes::{resources, ClusterGateway};
use crate::naming::{self, ManagedLabels};
use crate::store::NamespaceStore;
use crate::types::{NamespaceName, OwnerId, TenantNamespace};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// One remote call of the provisioning sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    CreateNamespace,
    CreateServiceAccount,
    CreateRole,
    CreateRoleBinding,
    CreateTokenSecret,
    RecordNamespace,
    CreateClusterRoleBinding,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            ProvisionStep::CreateNamespace => "creating namespace",
            ProvisionStep::CreateServiceAccount => "creating service account",
            ProvisionStep::CreateRole => "creating role",
            ProvisionStep::CreateRoleBinding => "creating role binding",
            ProvisionStep::CreateTokenSecret => "creating token secret",
            ProvisionStep::RecordNamespace => "recording namespace",
            ProvisionStep::CreateClusterRoleBinding => "creating cluster role binding",
        };
        f.write_str(step)
    }
}

/// Tag an error with the step that produced it
fn at_step<T>(step: ProvisionStep, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        error!("Provisioning failed while {}: {}", step, e);
        KennelError::Provision {
            step,
            source: Box::new(e),
        }
    })
}

/// Where a namespace stands in its provisioning lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// Nothing exists anywhere
    Absent,
    /// The namespace exists but some access-control objects are missing
    ClusterCreated,
    /// Namespace and access control exist, no record was written
    FullyProvisioned,
    /// Everything exists and the record is written
    Recorded,
    /// Recorded, but the namespace is gone from the cluster
    RecordedClusterAbsent,
    /// Recorded, but some access-control objects are missing
    RecordedIncomplete,
}

/// Which pieces of a tenant namespace exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NamespaceStatus {
    pub recorded: bool,
    pub namespace: bool,
    pub service_account: bool,
    pub role: bool,
    pub role_binding: bool,
    /// Optional, not part of the provisioning state
    pub cluster_binding: bool,
}

impl NamespaceStatus {
    fn access_control_complete(&self) -> bool {
        self.service_account && self.role && self.role_binding
    }

    pub fn state(&self) -> ProvisioningState {
        match (self.recorded, self.namespace, self.access_control_complete()) {
            (false, false, _) => ProvisioningState::Absent,
            (false, true, false) => ProvisioningState::ClusterCreated,
            (false, true, true) => ProvisioningState::FullyProvisioned,
            (true, false, _) => ProvisioningState::RecordedClusterAbsent,
            (true, true, false) => ProvisioningState::RecordedIncomplete,
            (true, true, true) => ProvisioningState::Recorded,
        }
    }
}

/// Stands up tenant namespaces: cluster objects first, the record last.
///
/// Nothing is rolled back when a step fails; the error names the step.
#[derive(Clone)]
pub struct NamespaceProvisioner {
    gateway: ClusterGateway,
    store: Arc<dyn NamespaceStore>,
    cluster_role: String,
}

impl NamespaceProvisioner {
    pub fn new(
        gateway: ClusterGateway,
        store: Arc<dyn NamespaceStore>,
        cluster_role: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            cluster_role: cluster_role.into(),
        }
    }

    /// Validate, create the cluster objects in dependency order, then record the namespace
    #[instrument(skip(self))]
    pub async fn provision(&self, name: &str, owner: OwnerId) -> Result<TenantNamespace> {
        let name = NamespaceName::parse(name)?;

        if self.store.find_by_name(name.as_str()).await?.is_some() {
            return Err(KennelError::AlreadyRecorded(name.to_string()));
        }
        if !self.store.owner_exists(owner).await? {
            return Err(KennelError::UnknownOwner(owner.to_string()));
        }

        self.provision_cluster_objects(&name, owner).await?;

        let record = at_step(
            ProvisionStep::RecordNamespace,
            self.store.create(TenantNamespace::new(name, owner)).await,
        )?;
        info!("Namespace {} provisioned for {}", record.name, owner);

        Ok(record)
    }

    /// Create namespace, service account, role, role binding and token secret, in that order
    #[instrument(skip(self), fields(namespace = %name))]
    pub async fn provision_cluster_objects(&self, name: &NamespaceName, owner: OwnerId) -> Result<()> {
        let ns = name.as_str();

        at_step(
            ProvisionStep::CreateNamespace,
            self.gateway
                .create_namespace(&resources::tenant_namespace(ns, &ManagedLabels { owner }))
                .await,
        )?;

        at_step(
            ProvisionStep::CreateServiceAccount,
            self.gateway
                .create_service_account(ns, &resources::service_account(ns))
                .await,
        )?;

        at_step(
            ProvisionStep::CreateRole,
            self.gateway
                .create_role(ns, &resources::full_access_role(ns))
                .await,
        )?;

        at_step(
            ProvisionStep::CreateRoleBinding,
            self.gateway
                .create_role_binding(ns, &resources::role_binding(ns))
                .await,
        )?;

        at_step(
            ProvisionStep::CreateTokenSecret,
            self.gateway
                .create_secret(ns, &resources::token_secret(ns))
                .await,
        )?;

        debug!("Cluster objects for {} created", ns);
        Ok(())
    }

    /// Bind the namespace's service account to the shared cluster role; an existing binding is success
    #[instrument(skip(self))]
    pub async fn ensure_cluster_binding(&self, name: &str) -> Result<()> {
        let name = NamespaceName::parse(name)?;
        let binding = resources::cluster_role_binding(name.as_str(), &self.cluster_role);

        match self.gateway.create_cluster_role_binding(&binding).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(
                    "Cluster role binding {} already exists",
                    naming::cluster_role_binding_name(name.as_str())
                );
                Ok(())
            }
            Err(e) => at_step(ProvisionStep::CreateClusterRoleBinding, Err(e)),
        }
    }

    /// Report which parts of a namespace exist in the store and the cluster
    #[instrument(skip(self))]
    pub async fn inspect(&self, name: &str) -> Result<NamespaceStatus> {
        let name = NamespaceName::parse(name)?;
        let ns = name.as_str();

        let recorded = self.store.find_by_name(ns).await?.is_some();
        let cluster_binding = self
            .gateway
            .get_cluster_role_binding(&naming::cluster_role_binding_name(ns))
            .await?
            .is_some();

        if self.gateway.get_namespace(ns).await?.is_none() {
            return Ok(NamespaceStatus {
                recorded,
                cluster_binding,
                ..Default::default()
            });
        }

        Ok(NamespaceStatus {
            recorded,
            namespace: true,
            service_account: self
                .gateway
                .get_service_account(ns, &naming::service_account_name(ns))
                .await?
                .is_some(),
            role: self
                .gateway
                .get_role(ns, &naming::role_name(ns))
                .await?
                .is_some(),
            role_binding: self
                .gateway
                .get_role_binding(ns, &naming::role_binding_name(ns))
                .await?
                .is_some(),
            cluster_binding,
        })
    }
}
