#![allow(dead_code)]

use apiserver::app::App;
use apiserver::config::ApiServerConfig;
use apiserver::store::ZoneBackend;
use apiserver::store::memory::InMemoryZones;
use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;
use std::time::Duration;
use zonegate_authz::{IssueRequest, SharedSecret, TokenIssuer};

pub const SECRET: &str = "integration-secret";

pub const DOMAIN_LIST: &str = "/v1.DomainService/List";
pub const DOMAIN_GET: &str = "/v1.DomainService/Get";
pub const DOMAIN_CREATE: &str = "/v1.DomainService/Create";
pub const DOMAIN_UPDATE: &str = "/v1.DomainService/Update";
pub const DOMAIN_DELETE: &str = "/v1.DomainService/Delete";
pub const RECORD_LIST: &str = "/v1.RecordService/List";
pub const RECORD_CREATE: &str = "/v1.RecordService/Create";
pub const RECORD_UPDATE: &str = "/v1.RecordService/Update";
pub const RECORD_DELETE: &str = "/v1.RecordService/Delete";
pub const TOKEN_CREATE: &str = "/v1.TokenService/Create";
pub const HEALTH_CHECK: &str = "/grpc.health.v1.Health/Check";

pub const ALL_METHODS: [&str; 10] = [
    DOMAIN_LIST,
    DOMAIN_GET,
    DOMAIN_CREATE,
    DOMAIN_UPDATE,
    DOMAIN_DELETE,
    RECORD_LIST,
    RECORD_CREATE,
    RECORD_UPDATE,
    RECORD_DELETE,
    TOKEN_CREATE,
];

pub fn test_config() -> ApiServerConfig {
    ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().expect("bind"),
        metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
        secret: SECRET.to_string(),
        token_subject: "zonegate".to_string(),
        token_leeway_secs: 0,
        call_timeout: Duration::from_secs(5),
        max_body_bytes: 64 * 1024,
        seed_zones: Vec::new(),
    }
}

pub fn seeded_backend() -> Arc<InMemoryZones> {
    Arc::new(InMemoryZones::with_zones([
        "example.com.",
        "foo.bar.",
        "other.org.",
    ]))
}

pub fn router_with(backend: Arc<dyn ZoneBackend>) -> axum::Router {
    App::with_backend(&test_config(), backend)
        .expect("app")
        .into_router()
}

pub fn router() -> (axum::Router, Arc<InMemoryZones>) {
    let backend = seeded_backend();
    (router_with(backend.clone()), backend)
}

pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(
        "zonegate",
        SharedSecret::new(SECRET).expect("secret"),
    )
}

pub fn token(domains: &[&str], permissions: &[&str]) -> String {
    issuer()
        .issue(&IssueRequest::new(
            "tenant-a",
            domains.iter().map(|value| value.to_string()).collect(),
            permissions.iter().map(|value| value.to_string()).collect(),
        ))
        .expect("issue")
        .into_string()
}

/// Token scoped to `example.com.` and `foo.bar.` that may call every method.
pub fn tenant_token() -> String {
    token(&["example.com.", "foo.bar."], &ALL_METHODS)
}

pub fn rpc(path: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
