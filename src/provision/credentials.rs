// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service account credentials and the kubeconfig handed to tenants

use crate::constants::{secrets, KUBECONFIG_CLUSTER_NAME};
use crate::error::{KennelError, Result};
use crate::kubernetes::ClusterGateway;
use crate::naming;
use crate::types::NamespaceName;
use base64::Engine;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use serde::Serialize;
use tracing::{debug, instrument};

/// Certificate and bearer token of a tenant's service account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub certificate: String,
    pub token: String,
}

impl Credentials {
    pub fn certificate_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.certificate)
    }
}

/// Reads tenant credentials out of the cluster
#[derive(Clone)]
pub struct CredentialResolver {
    gateway: ClusterGateway,
    endpoint: String,
}

impl CredentialResolver {
    pub fn new(gateway: ClusterGateway, endpoint: impl Into<String>) -> Self {
        Self {
            gateway,
            endpoint: endpoint.into(),
        }
    }

    /// API server URL tenants connect to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn certificate(&self, name: &str) -> Result<String> {
        Ok(self.credentials(name).await?.certificate)
    }

    pub async fn certificate_base64(&self, name: &str) -> Result<String> {
        Ok(self.credentials(name).await?.certificate_base64())
    }

    pub async fn token(&self, name: &str) -> Result<String> {
        Ok(self.credentials(name).await?.token)
    }

    /// Read certificate and token from the service account's token secret
    #[instrument(skip(self))]
    pub async fn credentials(&self, name: &str) -> Result<Credentials> {
        let name = NamespaceName::parse(name)?;
        let secret = self.token_secret(&name).await?;

        Ok(Credentials {
            certificate: secret_value(&secret, secrets::CA_CERT_KEY)?,
            token: secret_value(&secret, secrets::TOKEN_KEY)?,
        })
    }

    /// Kubeconfig granting access to exactly this namespace
    #[instrument(skip(self))]
    pub async fn render_config(&self, name: &str) -> Result<String> {
        let credentials = self.credentials(name).await?;
        render_kubeconfig(&self.endpoint, name, &credentials)
    }

    /// Locate the service account's token secret.
    ///
    /// The secret created during provisioning is tried first. Older clusters
    /// generate `<account>-token-<suffix>` secrets and list them on the account;
    /// those references are scanned next. Any candidate must be a
    /// service-account token bound to this account.
    async fn token_secret(&self, name: &NamespaceName) -> Result<Secret> {
        let ns = name.as_str();
        let account_name = naming::service_account_name(ns);
        let secret_name = naming::token_secret_name(ns);

        if let Some(secret) = self.bound_token(ns, &secret_name, &account_name).await? {
            return Ok(secret);
        }

        let account = self
            .gateway
            .get_service_account(ns, &account_name)
            .await?
            .ok_or_else(|| KennelError::NoCredentialSecret(account_name.clone()))?;

        let candidates = account
            .secrets
            .iter()
            .flatten()
            .filter_map(|reference| reference.name.as_deref())
            .filter(|candidate| {
                *candidate != secret_name.as_str() && is_token_secret_name(candidate, &secret_name)
            });

        for candidate in candidates {
            if let Some(secret) = self.bound_token(ns, candidate, &account_name).await? {
                return Ok(secret);
            }
        }

        Err(KennelError::NoCredentialSecret(account_name))
    }

    /// The named secret, if it exists and is a token for `account_name`
    async fn bound_token(
        &self,
        ns: &str,
        secret_name: &str,
        account_name: &str,
    ) -> Result<Option<Secret>> {
        match self.gateway.get_secret(ns, secret_name).await? {
            Some(secret) if is_bound_token(&secret, account_name) => {
                debug!("Using token secret {}/{}", ns, secret_name);
                Ok(Some(secret))
            }
            Some(_) => {
                debug!("Secret {}/{} is not a token for {}", ns, secret_name, account_name);
                Ok(None)
            }
            None => {
                debug!("Secret {}/{} not found", ns, secret_name);
                Ok(None)
            }
        }
    }
}

/// `<prefix>` itself or `<prefix>-<suffix>`
fn is_token_secret_name(secret_name: &str, prefix: &str) -> bool {
    match secret_name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.len() > 1 && rest.starts_with('-'),
        None => false,
    }
}

fn is_bound_token(secret: &Secret, account_name: &str) -> bool {
    secret.type_.as_deref() == Some(secrets::TOKEN_TYPE)
        && secret
            .annotations()
            .get(secrets::SERVICE_ACCOUNT_ANNOTATION)
            .is_some_and(|account| account == account_name)
}

fn secret_value(secret: &Secret, key: &str) -> Result<String> {
    let missing = || KennelError::MissingSecretKey {
        secret: secret.name_any(),
        key: key.to_string(),
    };

    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or_else(missing)?;

    String::from_utf8(bytes.0.clone()).map_err(|_| missing())
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct KubeconfigDocument<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'a str,
    kind: &'a str,
    clusters: Vec<NamedCluster<'a>>,
    users: Vec<NamedUser<'a>>,
    contexts: Vec<NamedContext<'a>>,
    current_context: &'a str,
}

#[derive(Serialize)]
struct NamedCluster<'a> {
    name: &'a str,
    cluster: ClusterEntry<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterEntry<'a> {
    certificate_authority_data: String,
    server: &'a str,
}

#[derive(Serialize)]
struct NamedUser<'a> {
    name: &'a str,
    user: UserEntry<'a>,
}

#[derive(Serialize)]
struct UserEntry<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct NamedContext<'a> {
    name: &'a str,
    context: ContextEntry<'a>,
}

#[derive(Serialize)]
struct ContextEntry<'a> {
    cluster: &'a str,
    namespace: &'a str,
    user: &'a str,
}

/// Render a kubeconfig for `namespace`: one cluster, one user `<namespace>-user`, one context `<namespace>`
pub fn render_kubeconfig(endpoint: &str, namespace: &str, credentials: &Credentials) -> Result<String> {
    let user = naming::service_account_name(namespace);

    let document = KubeconfigDocument {
        api_version: "v1",
        kind: "Config",
        clusters: vec![NamedCluster {
            name: KUBECONFIG_CLUSTER_NAME,
            cluster: ClusterEntry {
                certificate_authority_data: credentials.certificate_base64(),
                server: endpoint,
            },
        }],
        users: vec![NamedUser {
            name: &user,
            user: UserEntry {
                token: &credentials.token,
            },
        }],
        contexts: vec![NamedContext {
            name: namespace,
            context: ContextEntry {
                cluster: KUBECONFIG_CLUSTER_NAME,
                namespace,
                user: &user,
            },
        }],
        current_context: namespace,
    };

    Ok(serde_yaml::to_string(&document)?)
}
