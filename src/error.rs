// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::provision::ProvisionStep;
use crate::sync::SyncReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KennelError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to render kubeconfig: {0}")]
    RenderError(#[from] serde_yaml::Error),

    #[error("Invalid namespace name: {0}")]
    InvalidName(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Namespace {0} is already recorded")]
    AlreadyRecorded(String),

    #[error("Namespace {0} is not recorded")]
    NotRecorded(String),

    #[error("Owner {0} does not exist")]
    UnknownOwner(String),

    #[error("{step} failed: {source}")]
    Provision {
        step: ProvisionStep,
        #[source]
        source: Box<KennelError>,
    },

    #[error("No credential secret found for service account {0}")]
    NoCredentialSecret(String),

    #[error("Credential secret {secret} has no usable '{key}' entry")]
    MissingSecretKey { secret: String, key: String },

    #[error("Reconciliation finished with {} failure(s)", .0.failures.len())]
    SyncFailed(Box<SyncReport>),
}

impl KennelError {
    /// True when the API server rejected a create because the object exists
    pub fn is_already_exists(&self) -> bool {
        matches!(self, KennelError::KubeError(kube::Error::Api(err)) if err.code == 409)
    }

    /// True when the API server reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, KennelError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }
}

pub type Result<T> = std::result::Result<T, KennelError>;
