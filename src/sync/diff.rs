// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::types::{ClusterNamespace, TenantNamespace};
use std::collections::HashSet;

/// Namespaces present on only one side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceDiff {
    /// Recorded, but absent from the cluster
    pub missing_from_cluster: Vec<TenantNamespace>,
    /// Managed in the cluster, but never recorded
    pub missing_from_database: Vec<ClusterNamespace>,
}

impl NamespaceDiff {
    /// Compare by name. Input order is preserved in both lists.
    pub fn between(records: Vec<TenantNamespace>, cluster: Vec<ClusterNamespace>) -> Self {
        let recorded: HashSet<String> = records.iter().map(|r| r.name.to_string()).collect();
        let live: HashSet<&str> = cluster.iter().map(|ns| ns.name.as_str()).collect();

        let missing_from_cluster = records
            .iter()
            .filter(|r| !live.contains(r.name.as_str()))
            .cloned()
            .collect();

        let missing_from_database = cluster
            .iter()
            .filter(|ns| !recorded.contains(&ns.name))
            .cloned()
            .collect();

        Self {
            missing_from_cluster,
            missing_from_database,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing_from_cluster.is_empty() && self.missing_from_database.is_empty()
    }
}
