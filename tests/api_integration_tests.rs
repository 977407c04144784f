//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cachebox::{api::create_router, AppState, CacheConfig, StoreConfig, StoreFactory};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let config = CacheConfig::default()
        .with_store("sessions", StoreConfig::new("memory").with_ttl(60))
        .with_store("broken", StoreConfig::new("file"));
    create_router(AppState::new(StoreFactory::new(config)))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == PUT / GET ==

#[tokio::test]
async fn test_put_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/test_key",
            r#"{"value":"test_value"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_put_then_get() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/answer",
            r#"{"value":42,"ttl":60}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/stores/memory/keys/answer"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "answer");
    assert_eq!(json["value"], 42);
}

#[tokio::test]
async fn test_put_forever() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/stores/sessions/keys/pinned",
            r#"{"value":"x","forever":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/stores/sessions/keys/pinned"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/stores/memory/keys/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_stores_are_isolated() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/shared",
            r#"{"value":1}"#,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("GET", "/stores/sessions/keys/shared"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Add / Pull ==

#[tokio::test]
async fn test_add_endpoint() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/stores/memory/keys/lock/add",
            r#"{"value":"owner-1"}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["added"], true);

    let response = app
        .oneshot(json_request(
            "POST",
            "/stores/memory/keys/lock/add",
            r#"{"value":"owner-2"}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["added"], false);
}

#[tokio::test]
async fn test_pull_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/token",
            r#"{"value":"abc"}"#,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/stores/memory/keys/token/pull"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], "abc");

    let response = app
        .oneshot(json_request(
            "POST",
            "/stores/memory/keys/token/pull",
            r#"{"default":"none"}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], "none");
}

// == Counters ==

#[tokio::test]
async fn test_counter_endpoints() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/stores/memory/keys/c/incr"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/stores/memory/keys/c/incr",
            r#"{"delta":9}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 10);

    let response = app
        .oneshot(json_request(
            "POST",
            "/stores/memory/keys/c/decr",
            r#"{"delta":3}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 7);
}

// == DELETE / Flush ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/delete_key",
            r#"{"value":"delete_value"}"#,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/stores/memory/keys/delete_key"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("DELETE", "/stores/memory/keys/delete_key"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flush_endpoint() {
    let app = create_test_app();

    for key in ["a", "b"] {
        app.clone()
            .oneshot(json_request(
                "PUT",
                &format!("/stores/memory/keys/{}", key),
                r#"{"value":1}"#,
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/stores/memory"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for key in ["a", "b"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/stores/memory/keys/{}", key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// == Errors ==

#[tokio::test]
async fn test_unknown_driver_is_server_error() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/stores/broken/keys/k"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_invalid_json_body() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/stores/memory/keys/k",
            r#"{"ttl":5}"#,
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
