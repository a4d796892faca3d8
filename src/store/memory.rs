// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-process store backing the provisioner and reconciler tests

use super::{CoOwnerStore, NamespaceStore};
use crate::error::{KennelError, Result};
use crate::types::{OwnerId, TenantNamespace};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    namespaces: Vec<TenantNamespace>,
    owners: HashSet<OwnerId>,
    co_owners: HashMap<Uuid, BTreeSet<OwnerId>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records, kept in `list` order; their owners become known users
    pub fn with_namespaces(namespaces: impl IntoIterator<Item = TenantNamespace>) -> Self {
        let mut namespaces: Vec<_> = namespaces.into_iter().collect();
        sort(&mut namespaces);
        let owners = namespaces.iter().map(|n| n.owner_id).collect();

        Self {
            state: RwLock::new(State {
                namespaces,
                owners,
                co_owners: HashMap::new(),
            }),
        }
    }

    /// Register a known user
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.state.get_mut().owners.insert(owner);
        self
    }
}

fn sort(namespaces: &mut [TenantNamespace]) {
    namespaces.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[async_trait]
impl NamespaceStore for MemoryStore {
    async fn create(&self, namespace: TenantNamespace) -> Result<TenantNamespace> {
        let mut state = self.state.write().await;

        if state.namespaces.iter().any(|n| n.name == namespace.name) {
            return Err(KennelError::AlreadyRecorded(namespace.name.to_string()));
        }

        state.namespaces.push(namespace.clone());
        sort(&mut state.namespaces);
        Ok(namespace)
    }

    async fn find(&self, id: Uuid) -> Result<Option<TenantNamespace>> {
        let state = self.state.read().await;
        Ok(state.namespaces.iter().find(|n| n.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TenantNamespace>> {
        let state = self.state.read().await;
        Ok(state
            .namespaces
            .iter()
            .find(|n| n.name.as_str() == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<TenantNamespace>> {
        Ok(self.state.read().await.namespaces.clone())
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<TenantNamespace>> {
        let state = self.state.read().await;
        Ok(state
            .namespaces
            .iter()
            .filter(|n| n.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn owner_exists(&self, owner: OwnerId) -> Result<bool> {
        Ok(self.state.read().await.owners.contains(&owner))
    }
}

#[async_trait]
impl CoOwnerStore for MemoryStore {
    async fn add_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()> {
        let mut state = self.state.write().await;

        let owner = state
            .namespaces
            .iter()
            .find(|n| n.id == namespace_id)
            .map(|n| n.owner_id)
            .ok_or_else(|| KennelError::NotRecorded(namespace_id.to_string()))?;

        if owner != user {
            state.co_owners.entry(namespace_id).or_default().insert(user);
        }
        Ok(())
    }

    async fn remove_co_owner(&self, namespace_id: Uuid, user: OwnerId) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(users) = state.co_owners.get_mut(&namespace_id) {
            users.remove(&user);
        }
        Ok(())
    }

    async fn list_co_owners(&self, namespace_id: Uuid) -> Result<Vec<OwnerId>> {
        let state = self.state.read().await;
        Ok(state
            .co_owners
            .get(&namespace_id)
            .map(|users| users.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamespaceName;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn record(name: &str, owner: OwnerId) -> TenantNamespace {
        TenantNamespace::new(NamespaceName::parse(name).unwrap(), owner)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();
        let owner = OwnerId::new_v4();
        let created = store.create(record("team-x", owner)).await.unwrap();

        assert_eq!(store.find(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.find_by_name("team-x").await.unwrap(), Some(created));
        assert_eq!(store.find_by_name("team-y").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let store = MemoryStore::new();
        let owner = OwnerId::new_v4();
        store.create(record("team-x", owner)).await.unwrap();

        assert_matches!(
            store.create(record("team-x", OwnerId::new_v4())).await,
            Err(KennelError::AlreadyRecorded(name)) if name == "team-x"
        );
    }

    #[tokio::test]
    async fn test_list_orders_by_creation_then_name() {
        let owner = OwnerId::new_v4();
        let now = Utc::now();
        let mut old = record("zeta", owner);
        old.created_at = now - Duration::hours(1);
        let mut b = record("beta", owner);
        b.created_at = now;
        let mut a = record("alpha", owner);
        a.created_at = now;

        let store = MemoryStore::with_namespaces([b, a, old]);
        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name.to_string())
            .collect();

        assert_eq!(names, ["zeta", "alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let alice = OwnerId::new_v4();
        let bob = OwnerId::new_v4();
        let store = MemoryStore::with_namespaces([record("a", alice), record("b", bob)]);

        let owned = store.list_by_owner(bob).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name.as_str(), "b");
    }

    #[tokio::test]
    async fn test_owner_exists() {
        let known = OwnerId::new_v4();
        let recorded = OwnerId::new_v4();
        let store = MemoryStore::with_namespaces([record("a", recorded)]).with_owner(known);

        assert!(store.owner_exists(known).await.unwrap());
        assert!(store.owner_exists(recorded).await.unwrap());
        assert!(!store.owner_exists(OwnerId::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_co_owners() {
        let owner = OwnerId::new_v4();
        let friend = OwnerId::new_v4();
        let store = MemoryStore::new();
        let ns = store.create(record("team-x", owner)).await.unwrap();

        store.add_co_owner(ns.id, friend).await.unwrap();
        store.add_co_owner(ns.id, friend).await.unwrap();
        store.add_co_owner(ns.id, owner).await.unwrap();
        assert_eq!(store.list_co_owners(ns.id).await.unwrap(), [friend]);

        store.remove_co_owner(ns.id, friend).await.unwrap();
        store.remove_co_owner(ns.id, friend).await.unwrap();
        assert!(store.list_co_owners(ns.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_co_owner_unknown_namespace() {
        let store = MemoryStore::new();
        assert_matches!(
            store.add_co_owner(Uuid::new_v4(), OwnerId::new_v4()).await,
            Err(KennelError::NotRecorded(_))
        );
    }
}
