// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed access to the cluster objects kennel manages

use crate::error::Result;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, Role, RoleBinding};
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

/// Create, read and delete operations against the cluster control plane.
///
/// Errors are returned untouched; callers decide which conditions (such as
/// "already exists") they can tolerate.
#[derive(Clone)]
pub struct ClusterGateway {
    client: Client,
}

impl ClusterGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn service_accounts(&self, namespace: &str) -> Api<ServiceAccount> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn roles(&self, namespace: &str) -> Api<Role> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn role_bindings(&self, namespace: &str) -> Api<RoleBinding> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn cluster_role_bindings(&self) -> Api<ClusterRoleBinding> {
        Api::all(self.client.clone())
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    // Namespaces

    #[instrument(skip(self, namespace), fields(namespace = %namespace.name_any()))]
    pub async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace> {
        let created = self
            .namespaces()
            .create(&PostParams::default(), namespace)
            .await?;
        info!("Namespace {} created", created.name_any());
        Ok(created)
    }

    pub async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        Ok(self.namespaces().get_opt(name).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.namespaces()
            .delete(name, &DeleteParams::default())
            .await?;
        info!("Namespace {} deleted", name);
        Ok(())
    }

    /// List namespaces matching a label selector
    #[instrument(skip(self))]
    pub async fn list_namespaces(&self, selector: &str) -> Result<Vec<Namespace>> {
        let list = self
            .namespaces()
            .list(&ListParams::default().labels(selector))
            .await?;
        debug!("Found {} namespaces matching {}", list.items.len(), selector);
        Ok(list.items)
    }

    // Service accounts

    #[instrument(skip(self, account), fields(account = %account.name_any()))]
    pub async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> Result<ServiceAccount> {
        let created = self
            .service_accounts(namespace)
            .create(&PostParams::default(), account)
            .await?;
        info!("Service account {}/{} created", namespace, created.name_any());
        Ok(created)
    }

    pub async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>> {
        Ok(self.service_accounts(namespace).get_opt(name).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_service_account(&self, namespace: &str, name: &str) -> Result<()> {
        self.service_accounts(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        info!("Service account {}/{} deleted", namespace, name);
        Ok(())
    }

    // Roles

    #[instrument(skip(self, role), fields(role = %role.name_any()))]
    pub async fn create_role(&self, namespace: &str, role: &Role) -> Result<Role> {
        let created = self
            .roles(namespace)
            .create(&PostParams::default(), role)
            .await?;
        info!("Role {}/{} created", namespace, created.name_any());
        Ok(created)
    }

    pub async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>> {
        Ok(self.roles(namespace).get_opt(name).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, namespace: &str, name: &str) -> Result<()> {
        self.roles(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        info!("Role {}/{} deleted", namespace, name);
        Ok(())
    }

    // Role bindings

    #[instrument(skip(self, binding), fields(binding = %binding.name_any()))]
    pub async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding> {
        let created = self
            .role_bindings(namespace)
            .create(&PostParams::default(), binding)
            .await?;
        info!("Role binding {}/{} created", namespace, created.name_any());
        Ok(created)
    }

    pub async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RoleBinding>> {
        Ok(self.role_bindings(namespace).get_opt(name).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<()> {
        self.role_bindings(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        info!("Role binding {}/{} deleted", namespace, name);
        Ok(())
    }

    // Cluster role bindings

    #[instrument(skip(self, binding), fields(binding = %binding.name_any()))]
    pub async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
    ) -> Result<ClusterRoleBinding> {
        let created = self
            .cluster_role_bindings()
            .create(&PostParams::default(), binding)
            .await?;
        info!("Cluster role binding {} created", created.name_any());
        Ok(created)
    }

    pub async fn get_cluster_role_binding(&self, name: &str) -> Result<Option<ClusterRoleBinding>> {
        Ok(self.cluster_role_bindings().get_opt(name).await?)
    }

    // Secrets

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    pub async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let created = self
            .secrets(namespace)
            .create(&PostParams::default(), secret)
            .await?;
        info!("Secret {}/{} created", namespace, created.name_any());
        Ok(created)
    }

    pub async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        Ok(self.secrets(namespace).get_opt(name).await?)
    }
}
