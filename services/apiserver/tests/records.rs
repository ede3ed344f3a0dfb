mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

async fn call(
    app: &axum::Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(rpc(path, Some(token), body))
        .await
        .expect("response");
    let status = response.status();
    (status, read_json(response).await)
}

async fn create(app: &axum::Router, token: &str, name: &str, record_type: &str, data: &str) {
    let (status, body) = call(
        app,
        RECORD_CREATE,
        token,
        serde_json::json!({
            "name": name,
            "type": record_type,
            "data": data,
            "ttl": 300
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

fn record_names(body: &serde_json::Value) -> Vec<(String, String)> {
    body["records"]
        .as_array()
        .expect("records")
        .iter()
        .map(|record| {
            (
                record["name"].as_str().expect("name").to_string(),
                record["type"].as_str().expect("type").to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn create_then_list_by_name_and_type() {
    let (app, _) = router();
    let token = tenant_token();
    create(&app, &token, "www.example.com.", "A", "192.0.2.10").await;
    create(&app, &token, "www.example.com.", "TXT", "hello").await;
    create(&app, &token, "mail.example.com.", "A", "192.0.2.20").await;

    let (status, body) = call(
        &app,
        RECORD_LIST,
        &token,
        serde_json::json!({ "domain": "example.com.", "type": "ANY" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record_names(&body).len(), 3);

    let (_, body) = call(
        &app,
        RECORD_LIST,
        &token,
        serde_json::json!({ "domain": "example.com.", "type": "A" }),
    )
    .await;
    assert_eq!(
        record_names(&body),
        vec![
            ("www.example.com.".to_string(), "A".to_string()),
            ("mail.example.com.".to_string(), "A".to_string()),
        ]
    );

    let (_, body) = call(
        &app,
        RECORD_LIST,
        &token,
        serde_json::json!({ "domain": "example.com.", "name": "www.example.com." }),
    )
    .await;
    assert_eq!(record_names(&body).len(), 2);

    let (_, body) = call(
        &app,
        RECORD_LIST,
        &token,
        serde_json::json!({
            "domain": "example.com.",
            "name": "www.example.com.",
            "type": "TXT"
        }),
    )
    .await;
    assert_eq!(body["records"][0]["data"], "hello");
    assert_eq!(body["records"][0]["ttl"], 300);
}

#[tokio::test]
async fn disabled_records_are_hidden() {
    let (app, backend) = router();
    apiserver::store::ZoneBackend::create_record(
        backend.as_ref(),
        "example.com.",
        apiserver::store::Record {
            name: "old.example.com.".to_string(),
            record_type: apiserver::store::RecordType::A,
            data: "192.0.2.99".to_string(),
            ttl: 60,
            disabled: true,
        },
    )
    .await
    .expect("seed");
    let (status, body) = call(
        &app,
        RECORD_LIST,
        &tenant_token(),
        serde_json::json!({ "domain": "example.com." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(record_names(&body).is_empty());
}

#[tokio::test]
async fn record_zone_must_be_in_scope() {
    let (app, _) = router();
    let (status, body) = call(
        &app,
        RECORD_CREATE,
        &tenant_token(),
        serde_json::json!({
            "name": "www.other.org.",
            "type": "A",
            "data": "192.0.2.1",
            "ttl": 60
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "resource:other.org. is not allowed to create, only [example.com. foo.bar.]"
    );

    let (status, body) = call(
        &app,
        RECORD_LIST,
        &tenant_token(),
        serde_json::json!({ "domain": "other.org." }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "resource:other.org. is not allowed to list, only [example.com. foo.bar.]"
    );
}

#[tokio::test]
async fn invalid_record_names_are_rejected() {
    let (app, _) = router();
    for name in ["localhost", "www..example.com.", ""] {
        let (status, body) = call(
            &app,
            RECORD_CREATE,
            &tenant_token(),
            serde_json::json!({ "name": name, "type": "A", "data": "192.0.2.1" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name}");
        assert_eq!(body["code"], "invalid_argument");
    }
}

#[tokio::test]
async fn any_type_cannot_be_written() {
    let (app, _) = router();
    let (status, body) = call(
        &app,
        RECORD_CREATE,
        &tenant_token(),
        serde_json::json!({ "name": "www.example.com.", "type": "ANY", "data": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn update_and_delete_records() {
    let (app, _) = router();
    let token = tenant_token();
    create(&app, &token, "www.foo.bar.", "CNAME", "foo.bar.").await;

    let (status, body) = call(
        &app,
        RECORD_UPDATE,
        &token,
        serde_json::json!({
            "name": "www.foo.bar.",
            "type": "CNAME",
            "data": "example.com.",
            "ttl": 120
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["data"], "example.com.");
    assert_eq!(body["record"]["ttl"], 120);

    let (status, body) = call(
        &app,
        RECORD_DELETE,
        &token,
        serde_json::json!({ "name": "www.foo.bar.", "type": "CNAME" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["name"], "www.foo.bar.");

    let (status, body) = call(
        &app,
        RECORD_UPDATE,
        &token,
        serde_json::json!({ "name": "www.foo.bar.", "type": "CNAME", "data": "x." }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn records_in_missing_zone_are_not_found() {
    let (app, backend) = router();
    apiserver::store::ZoneBackend::delete_zone(backend.as_ref(), "example.com.")
        .await
        .expect("delete");
    let (status, body) = call(
        &app,
        RECORD_LIST,
        &tenant_token(),
        serde_json::json!({ "domain": "example.com." }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
