// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request the mock API server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
enum Reply {
    Canned(u16, String),
    /// Answer with the request body, as the API server does for a successful create
    Echo(u16),
}

/// A mock HTTP service answering by exact method and path.
///
/// Several replies can be queued for one route; they are served in order and
/// the last one is repeated. Every request is recorded so tests can assert on
/// the order of remote calls.
#[derive(Clone)]
pub struct MockService {
    routes: Arc<Mutex<HashMap<(String, String), VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, method: &str, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.push("GET", path, Reply::Canned(status, body.to_string()))
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.push("POST", path, Reply::Canned(status, body.to_string()))
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.push("DELETE", path, Reply::Canned(status, body.to_string()))
    }

    /// Accept POSTs to `path`, answering 201 with the submitted object
    pub fn on_create(self, path: &str) -> Self {
        self.push("POST", path, Reply::Echo(201))
    }

    /// Accept every create of a full tenant provisioning run
    pub fn on_provision(self, namespace: &str) -> Self {
        self.on_create("/api/v1/namespaces")
            .on_create(&format!("/api/v1/namespaces/{}/serviceaccounts", namespace))
            .on_create(&format!(
                "/apis/rbac.authorization.k8s.io/v1/namespaces/{}/roles",
                namespace
            ))
            .on_create(&format!(
                "/apis/rbac.authorization.k8s.io/v1/namespaces/{}/rolebindings",
                namespace
            ))
            .on_create(&format!("/api/v1/namespaces/{}/secrets", namespace))
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `METHOD path` of every request, in arrival order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    fn next_reply(&self, method: &str, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method.to_string(), path.to_string()))?;

        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let reply = self.next_reply(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            let body = serde_json::from_slice::<serde_json::Value>(&bytes).ok();

            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body: body.clone(),
            });

            let (status, payload) = match reply {
                Some(Reply::Canned(status, payload)) => (status, payload.into_bytes()),
                Some(Reply::Echo(status)) => (status, bytes.to_vec()),
                None => (404, not_found_json("resource", "unknown").into_bytes()),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// A managed namespace list as returned for the kennel label selector
pub fn namespace_list_json(names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "metadata": {
                    "name": name,
                    "labels": {
                        "kennel.dev/managed": "true",
                        "kennel.dev/owner": "6f0c1a52-8c4e-4bde-a3f4-3f5e7a2c9d10"
                    }
                }
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": {},
        "items": items
    })
    .to_string()
}

/// Service account declaring the given secret references
pub fn service_account_json(namespace: &str, name: &str, secrets: &[&str]) -> String {
    let refs: Vec<_> = secrets
        .iter()
        .map(|s| serde_json::json!({ "name": s }))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": {
            "name": name,
            "namespace": namespace
        },
        "secrets": refs
    })
    .to_string()
}

/// Secret of the given type, bound to `account`, holding `data` (raw values, encoded here)
pub fn secret_json(
    namespace: &str,
    name: &str,
    type_: &str,
    account: &str,
    data: &[(&str, &str)],
) -> String {
    use base64::Engine;

    let data: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(k, v)| {
            (
                k.to_string(),
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(v)),
            )
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "annotations": {
                "kubernetes.io/service-account.name": account
            }
        },
        "type": type_,
        "data": data
    })
    .to_string()
}

/// A Status object as returned for API failures
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": if code < 400 { "Success" } else { "Failure" },
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(
        404,
        "NotFound",
        &format!("{} \"{}\" not found", resource, name),
    )
}
