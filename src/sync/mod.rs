// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation between the system of record and the cluster.

pub mod diff;
pub mod engine;

pub use diff::NamespaceDiff;
pub use engine::{
    ParseSyncPolicyError, ReconciliationEngine, SyncAction, SyncFailure, SyncPolicy, SyncReport,
};
