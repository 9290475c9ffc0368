//! Integration Tests for the Key Set Server
//!
//! These tests drive the full axum router in-process:
//! - Generation, retrieval and deletion over HTTP
//! - Status codes and error bodies
//! - Bearer token handling and anonymous access
//! - Discovery of the ID token set

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use keyset_core::{GeneratorRegistry, Rs256Generator};
use keyset_firewall::{AuthorizationGate, MemoryFirewall};
use keyset_plane::{create_router, AppState, KeySetService, KeysConfig, MemoryKeyManager};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

const POLICIES: &str = r#"{
    "policies": [
        {
            "id": "admin",
            "subjects": ["admin"],
            "resources": ["rn:hydra:keys:*"],
            "actions": ["*"],
            "effect": "allow"
        },
        {
            "id": "reader",
            "subjects": ["reader"],
            "resources": ["rn:hydra:keys:*"],
            "actions": ["get"],
            "effect": "allow"
        },
        {
            "id": "public-jwks",
            "subjects": [""],
            "resources": ["rn:hydra:keys:hydra.openid.id-token:public:*"],
            "actions": ["get"],
            "effect": "allow"
        }
    ],
    "tokens": {
        "admin-token": { "subject": "admin", "scopes": ["hydra.keys"] },
        "reader-token": { "subject": "reader", "scopes": ["hydra.keys.get"] },
        "scopeless-token": { "subject": "admin", "scopes": ["openid"] }
    }
}"#;

fn app() -> Router {
    app_with(KeysConfig::default())
}

fn app_with(config: KeysConfig) -> Router {
    let firewall = MemoryFirewall::from_json(POLICIES).unwrap();
    let keys = KeySetService::new(
        Arc::new(MemoryKeyManager::new()),
        AuthorizationGate::new(Arc::new(firewall)),
        GeneratorRegistry::new().with_generator(Rs256Generator::with_bits(1024)),
        config,
    );
    create_router(Arc::new(AppState { keys }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "keys.example.com");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

fn kids(body: &Value) -> Vec<String> {
    body["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|key| key["kid"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Lifecycle over HTTP
// =============================================================================

#[tokio::test]
async fn test_generate_fetch_delete() {
    let app = app();

    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/keys/s",
        Some("admin-token"),
        Some(json!({ "alg": "HS256", "kid": "k1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "http://keys.example.com/keys/s");
    assert_eq!(kids(&body), vec!["k1"]);

    let (status, _, body) = send(&app, Method::GET, "/keys/s/k1", Some("reader-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"][0]["kty"], "oct");
    assert_eq!(body["keys"][0]["use"], "sig");

    let (status, _, _) = send(&app, Method::DELETE, "/keys/s/k1", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, Method::GET, "/keys/s/k1", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _, body) = send(&app, Method::GET, "/keys/s", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_generate_rs256_pair() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/keys/signing",
        Some("admin-token"),
        Some(json!({ "alg": "RS256", "kid": "k1" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(kids(&body), vec!["private:k1", "public:k1"]);
}

#[tokio::test]
async fn test_generate_into_set_with_control_character() {
    let app = app();

    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/keys/a%0Ab",
        Some("admin-token"),
        Some(json!({ "alg": "HS256", "kid": "k1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "http://keys.example.com/keys/a%0Ab");
    assert_eq!(kids(&body), vec!["k1"]);

    let (status, _, body) = send(&app, Method::GET, "/keys/a%0Ab", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kids(&body), vec!["k1"]);
}

#[tokio::test]
async fn test_generate_without_kid() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/keys/s",
        Some("admin-token"),
        Some(json!({ "alg": "RS256" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");

    let (status, _, _) = send(&app, Method::GET, "/keys/s", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_algorithm() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/keys/s",
        Some("admin-token"),
        Some(json!({ "alg": "XX000", "kid": "k1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_ALGORITHM");
    assert_eq!(body["error"], "Generator XX000 unknown");
    assert_eq!(body["details"]["algorithm"], "XX000");

    let (status, _, _) = send(&app, Method::GET, "/keys/s", Some("admin-token"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_replace_set_and_key() {
    let app = app();

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/keys/s",
        Some("admin-token"),
        Some(json!({ "keys": [
            { "kid": "a", "kty": "oct", "k": "c2VjcmV0" },
            { "kid": "b", "kty": "oct", "k": "c2VjcmV0" }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/keys/s/b",
        Some("admin-token"),
        Some(json!({ "kid": "b", "kty": "oct", "k": "bmV3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["k"], "bmV3");

    let (_, _, body) = send(&app, Method::GET, "/keys/s", Some("admin-token"), None).await;
    assert_eq!(kids(&body), vec!["a", "b"]);
    assert_eq!(body["keys"][1]["k"], "bmV3");
}

#[tokio::test]
async fn test_malformed_key_rejected() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/keys/s/a",
        Some("admin-token"),
        Some(json!({ "kid": "a", "kty": "RSA", "e": "AQAB" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");
}

#[tokio::test]
async fn test_strict_kid_matching_over_http() {
    let app = app_with(KeysConfig {
        require_matching_kid: true,
        public_url: Some("https://auth.example.com/".into()),
        ..KeysConfig::default()
    });

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/keys/s/a",
        Some("admin-token"),
        Some(json!({ "kid": "b", "kty": "oct", "k": "c2VjcmV0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, _) = send(
        &app,
        Method::POST,
        "/keys/s",
        Some("admin-token"),
        Some(json!({ "alg": "HS512", "kid": "k" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "https://auth.example.com/keys/s");
}

// =============================================================================
// Authorization over HTTP
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_forbidden() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/keys/s",
        None,
        Some(json!({ "alg": "HS256", "kid": "k1" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_reader_cannot_write() {
    let app = app();

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/keys/s",
        Some("reader-token"),
        Some(json!({ "alg": "HS256", "kid": "k1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, Method::DELETE, "/keys/s", Some("reader-token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_without_scope_is_forbidden() {
    let app = app();

    let (status, _, _) = send(&app, Method::DELETE, "/keys/s", Some("scopeless-token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Discovery and health
// =============================================================================

#[tokio::test]
async fn test_well_known_is_public() {
    let app = app();

    send(
        &app,
        Method::POST,
        "/keys/hydra.openid.id-token",
        Some("admin-token"),
        Some(json!({ "alg": "RS256", "kid": "id" })),
    )
    .await;

    let (status, _, body) = send(&app, Method::GET, "/.well-known/jwks.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kids(&body), vec!["public:id"]);
    assert!(body["keys"][0].get("d").is_none());

    let (status, _, _) = send(
        &app,
        Method::GET,
        "/keys/hydra.openid.id-token/private:id",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_well_known_without_keys() {
    let app = app();

    let (status, _, _) = send(&app, Method::GET, "/.well-known/jwks.json", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = app();

    let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
