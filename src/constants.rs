// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes label keys used by kennel
pub mod labels {
    /// Set to "true" on every namespace kennel manages
    pub const MANAGED: &str = "kennel.dev/managed";
    /// Identifier of the tenant owning the namespace
    pub const OWNER: &str = "kennel.dev/owner";
}

/// Well-known keys and values of service account token secrets
pub mod secrets {
    pub const TOKEN_TYPE: &str = "kubernetes.io/service-account-token";
    pub const SERVICE_ACCOUNT_ANNOTATION: &str = "kubernetes.io/service-account.name";
    pub const CA_CERT_KEY: &str = "ca.crt";
    pub const TOKEN_KEY: &str = "token";
}

/// RBAC constants for the tenant access-control objects
pub mod rbac {
    pub const API_GROUP: &str = "rbac.authorization.k8s.io";
    /// Cluster role bound by `ensure_cluster_binding` unless configured otherwise
    pub const DEFAULT_CLUSTER_ROLE: &str = "kennel-namespaced-cr";
}

/// Name of the single cluster entry in rendered kubeconfig documents
pub const KUBECONFIG_CLUSTER_NAME: &str = "cluster";
