// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builders for the cluster objects making up a tenant namespace

use crate::constants::{rbac, secrets};
use crate::naming::{self, ManagedLabels};
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject};
use kube::api::ObjectMeta;

/// The tenant namespace itself, labeled as managed
pub fn tenant_namespace(name: &str, labels: &ManagedLabels) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels.to_labels()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn service_account(namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(naming::service_account_name(namespace)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Full access to core, apps and extensions resources plus jobs and cronjobs
pub fn full_access_role(namespace: &str) -> Role {
    Role {
        metadata: ObjectMeta {
            name: Some(naming::role_name(namespace)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        rules: Some(vec![
            PolicyRule {
                api_groups: Some(strings(&["", "extensions", "apps"])),
                resources: Some(strings(&["*"])),
                verbs: strings(&["*"]),
                ..Default::default()
            },
            PolicyRule {
                api_groups: Some(strings(&["batch"])),
                resources: Some(strings(&["jobs", "cronjobs"])),
                verbs: strings(&["*"]),
                ..Default::default()
            },
        ]),
    }
}

/// Long-lived token for the service account; the token controller fills in `ca.crt` and `token`
pub fn token_secret(namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(naming::token_secret_name(namespace)),
            namespace: Some(namespace.to_string()),
            annotations: Some(
                [(
                    secrets::SERVICE_ACCOUNT_ANNOTATION.to_string(),
                    naming::service_account_name(namespace),
                )]
                .into(),
            ),
            ..Default::default()
        },
        type_: Some(secrets::TOKEN_TYPE.to_string()),
        ..Default::default()
    }
}

pub fn role_binding(namespace: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(naming::role_binding_name(namespace)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: rbac::API_GROUP.to_string(),
            kind: "Role".to_string(),
            name: naming::role_name(namespace),
        },
        subjects: Some(vec![service_account_subject(namespace)]),
    }
}

pub fn cluster_role_binding(namespace: &str, cluster_role: &str) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(naming::cluster_role_binding_name(namespace)),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: rbac::API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: cluster_role.to_string(),
        },
        subjects: Some(vec![service_account_subject(namespace)]),
    }
}

fn service_account_subject(namespace: &str) -> Subject {
    Subject {
        kind: "ServiceAccount".to_string(),
        name: naming::service_account_name(namespace),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
