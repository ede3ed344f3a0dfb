mod common;

use apiserver::app::{AppState, build_router};
use apiserver::auth::{CONNECT_TIMEOUT_HEADER, CallAuthorizer};
use apiserver::store::memory::InMemoryZones;
use apiserver::store::{
    Record, RecordQuery, RecordType, StoreResult, Zone, ZoneBackend, ZonePatch,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use zonegate_authz::{IssueRequest, RuleEngine, RuleSet, SharedSecret, now_epoch_seconds};

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    (status, read_json(response).await)
}

#[tokio::test]
async fn liveness_needs_no_credential() {
    let (app, _) = router();
    let (status, body) = call(app, rpc(HEALTH_CHECK, None, serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "SERVING" }));
}

#[tokio::test]
async fn liveness_reports_unhealthy_backend() {
    let (app, backend) = router();
    backend.set_healthy(false);
    let (status, body) = call(app, rpc(HEALTH_CHECK, None, serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "NOT_SERVING");
}

#[tokio::test]
async fn missing_header_is_unauthenticated() {
    let (app, _) = router();
    let (status, body) = call(app, rpc(DOMAIN_LIST, None, serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
    assert_eq!(body["message"], "no header:authorization found");
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthenticated() {
    let (app, _) = router();
    let request = Request::builder()
        .method("POST")
        .uri(DOMAIN_LIST)
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::from("{}"))
        .expect("request");
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "no bearer token found");
}

#[tokio::test]
async fn lowercase_scheme_is_accepted() {
    let (app, _) = router();
    let request = Request::builder()
        .method("POST")
        .uri(DOMAIN_LIST)
        .header("AUTHORIZATION", format!("bearer {}", tenant_token()))
        .body(Body::from("{}"))
        .expect("request");
    let (status, _) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn foreign_signature_is_unauthenticated() {
    let (app, _) = router();
    let forged = zonegate_authz::TokenIssuer::new(
        "zonegate",
        SharedSecret::new("someone-else").expect("secret"),
    )
    .issue(&IssueRequest::new(
        "tenant-a",
        vec!["example.com.".to_string()],
        vec![DOMAIN_LIST.to_string()],
    ))
    .expect("issue");
    let (status, body) = call(
        app,
        rpc(DOMAIN_LIST, Some(forged.as_str()), serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token signature is invalid");
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let (app, _) = router();
    let expired = issuer()
        .issue_at(
            &IssueRequest::new(
                "tenant-a",
                vec!["example.com.".to_string()],
                vec![DOMAIN_LIST.to_string()],
            )
            .with_validity(Duration::from_secs(3600)),
            now_epoch_seconds() - 3601,
        )
        .expect("issue");
    let (status, body) = call(
        app,
        rpc(DOMAIN_LIST, Some(expired.as_str()), serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token has expired");
}

#[tokio::test]
async fn permission_gate_names_the_method() {
    let (app, _) = router();
    let list_only = token(&["example.com."], &[DOMAIN_LIST]);

    let (status, body) = call(
        app.clone(),
        rpc(
            DOMAIN_CREATE,
            Some(&list_only),
            serde_json::json!({ "name": "example.com." }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "not allowed to call: /v1.DomainService/Create"
    );

    let (status, _) = call(app, rpc(DOMAIN_LIST, Some(&list_only), serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_body_is_accepted() {
    let (app, _) = router();
    let request = Request::builder()
        .method("POST")
        .uri(DOMAIN_LIST)
        .header("authorization", format!("Bearer {}", tenant_token()))
        .body(Body::empty())
        .expect("request");
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domains"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn malformed_json_body_is_invalid_argument() {
    let (app, _) = router();
    let request = Request::builder()
        .method("POST")
        .uri(DOMAIN_LIST)
        .header("authorization", format!("Bearer {}", tenant_token()))
        .body(Body::from("{\"domains\": ["))
        .expect("request");
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn unknown_method_is_not_found_without_credentials() {
    let (app, _) = router();
    let response = app
        .oneshot(rpc("/v1.DomainService/Rename", None, serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mismatched_engine_secret_is_internal() {
    let state = AppState {
        backend: seeded_backend(),
        issuer: Arc::new(issuer()),
    };
    let engine = RuleEngine::new(
        RuleSet::default(),
        SharedSecret::new(SECRET).expect("secret"),
    );
    let authorizer = CallAuthorizer::new(
        Arc::new(engine),
        SharedSecret::new("drifted-secret").expect("secret"),
        1024,
        Duration::from_secs(5),
    );
    let app = build_router(state, authorizer);
    let (status, body) = call(
        app,
        rpc(DOMAIN_LIST, Some(&tenant_token()), serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal");
}

struct SlowZones {
    inner: InMemoryZones,
    delay: Duration,
}

#[async_trait]
impl ZoneBackend for SlowZones {
    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_zones().await
    }

    async fn get_zone(&self, name: &str) -> StoreResult<Zone> {
        self.inner.get_zone(name).await
    }

    async fn create_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone> {
        self.inner.create_zone(name, patch).await
    }

    async fn update_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone> {
        self.inner.update_zone(name, patch).await
    }

    async fn delete_zone(&self, name: &str) -> StoreResult<()> {
        self.inner.delete_zone(name).await
    }

    async fn list_records(&self, zone: &str, query: &RecordQuery) -> StoreResult<Vec<Record>> {
        self.inner.list_records(zone, query).await
    }

    async fn create_record(&self, zone: &str, record: Record) -> StoreResult<Record> {
        self.inner.create_record(zone, record).await
    }

    async fn update_record(&self, zone: &str, record: Record) -> StoreResult<Record> {
        self.inner.update_record(zone, record).await
    }

    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> StoreResult<Record> {
        self.inner.delete_record(zone, name, record_type).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test]
async fn call_deadline_is_enforced() {
    let app = router_with(Arc::new(SlowZones {
        inner: InMemoryZones::with_zones(["example.com."]),
        delay: Duration::from_secs(2),
    }));
    let mut request = rpc(DOMAIN_LIST, Some(&tenant_token()), serde_json::json!({}));
    request
        .headers_mut()
        .insert(CONNECT_TIMEOUT_HEADER, "50".parse().expect("header"));
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "deadline_exceeded");
}
