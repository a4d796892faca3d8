// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the store, the provisioner and the reconciler.

pub mod tenant;

pub use tenant::{ClusterNamespace, NamespaceName, OwnerId, TenantNamespace};
