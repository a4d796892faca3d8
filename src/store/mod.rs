// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! System of record for tenant namespace ownership.

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::Result;
use crate::types::{OwnerId, TenantNamespace};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistent tenant → namespace ownership records
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    /// Persist a new record; a duplicate name yields `AlreadyRecorded`
    async fn create(&self, namespace: TenantNamespace) -> Result<TenantNamespace>;

    async fn find(&self, id: Uuid) -> Result<Option<TenantNamespace>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<TenantNamespace>>;

    /// Every record, oldest first, ties broken by name
    async fn list(&self) -> Result<Vec<TenantNamespace>>;

    /// Records owned by `owner`, in the same order as `list`
    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<TenantNamespace>>;

    /// Whether `owner` is a known user and may own namespaces
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool>;
}

/// Co-owners of a namespace besides its owner
#[async_trait]
pub trait CoOwnerStore: Send + Sync {
    /// Adding the owner or an existing co-owner is a no-op
    async fn add_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()>;

    /// Removing a user that is not a co-owner is a no-op
    async fn remove_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()>;

    async fn list_co_owners(&self, namespace_id: Uuid) -> Result<Vec<OwnerId>>;
}
