// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KennelError, Result};
use crate::naming::ManagedLabels;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

/// Longest name the API server accepts for a namespace
pub const MAX_NAME_LEN: usize = 253;

/// A namespace name that passed validation: lowercase alphanumerics, `.` and `-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceName(String);

impl NamespaceName {
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(KennelError::InvalidName("name cannot be empty".to_string()));
        }

        if name.len() > MAX_NAME_LEN {
            return Err(KennelError::InvalidName(format!(
                "{} is longer than {} characters",
                name, MAX_NAME_LEN
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(KennelError::InvalidName(format!(
                "{} must only contain lowercase alphanumerics, '.' and '-'",
                name
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = KennelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<NamespaceName> for String {
    fn from(value: NamespaceName) -> Self {
        value.0
    }
}

impl FromStr for NamespaceName {
    type Err = KennelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Identifier of the tenant (user) owning a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerId {
    type Err = KennelError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| KennelError::InvalidLabel(format!("invalid owner id {}: {}", s, e)))
    }
}

impl From<Uuid> for OwnerId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A namespace as recorded in the system of record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantNamespace {
    pub id: Uuid,
    pub name: NamespaceName,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantNamespace {
    /// Build a fresh record; ids and timestamps are assigned here, not by callers
    pub fn new(name: NamespaceName, owner_id: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A managed namespace as observed in the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNamespace {
    pub name: String,
    /// `None` when the owner label is missing or malformed
    pub owner: Option<OwnerId>,
}

impl From<&Namespace> for ClusterNamespace {
    fn from(ns: &Namespace) -> Self {
        let name = ns.name_any();
        let owner = match ManagedLabels::from_labels(ns.labels()) {
            Ok(labels) => Some(labels.owner),
            Err(e) => {
                warn!("Namespace {} carries unusable kennel labels: {}", name, e);
                None
            }
        };

        Self { name, owner }
    }
}
