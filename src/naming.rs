// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deterministic names and labels for the objects backing a tenant namespace.
//!
//! Every access-control object name is derived from the namespace name alone,
//! so any component can find the objects another one created.

use crate::constants::labels;
use crate::error::{KennelError, Result};
use crate::types::OwnerId;
use std::collections::BTreeMap;

/// Service account scoped to the tenant namespace
pub fn service_account_name(namespace: &str) -> String {
    format!("{}-user", namespace)
}

/// Role granting full access inside the tenant namespace
pub fn role_name(namespace: &str) -> String {
    format!("{}-user-full-access", namespace)
}

/// Binding of the service account to the namespaced role
pub fn role_binding_name(namespace: &str) -> String {
    format!("{}-user-view", namespace)
}

/// Binding of the service account to the shared cluster role
pub fn cluster_role_binding_name(namespace: &str) -> String {
    format!("{}-user-clusterrole-binding", namespace)
}

/// Token secret created for the service account; also the prefix of older auto-generated ones
pub fn token_secret_name(namespace: &str) -> String {
    format!("{}-token", service_account_name(namespace))
}

/// Labels marking a namespace as managed by kennel and recording its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedLabels {
    pub owner: OwnerId,
}

impl ManagedLabels {
    /// Label selector matching every managed namespace
    pub fn selector() -> String {
        format!("{}=true", labels::MANAGED)
    }

    pub fn to_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (labels::MANAGED.to_string(), "true".to_string()),
            (labels::OWNER.to_string(), self.owner.to_string()),
        ])
    }

    /// Read the labels back from a cluster object
    pub fn from_labels(map: &BTreeMap<String, String>) -> Result<Self> {
        match map.get(labels::MANAGED).map(String::as_str) {
            Some("true") => {}
            Some(other) => {
                return Err(KennelError::InvalidLabel(format!(
                    "{} is '{}', expected 'true'",
                    labels::MANAGED,
                    other
                )))
            }
            None => {
                return Err(KennelError::InvalidLabel(format!(
                    "{} is missing",
                    labels::MANAGED
                )))
            }
        }

        let owner = map
            .get(labels::OWNER)
            .ok_or_else(|| KennelError::InvalidLabel(format!("{} is missing", labels::OWNER)))?
            .parse()?;

        Ok(Self { owner })
    }
}
