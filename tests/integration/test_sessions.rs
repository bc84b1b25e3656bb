//! Session lifecycle tests against the HTTP transport.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use meridian::{
    create_router, Config, FixtureModel, MemoryStore, MeridianServer, SessionRegistry,
    SESSION_HEADER,
};

fn test_router() -> Router {
    let server = MeridianServer::new(
        Config::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(FixtureModel::new()),
    );
    create_router(server, Arc::new(SessionRegistry::new()))
}

fn post_rpc(session_id: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session_id {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn initialize_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.0.1" }
        }
    })
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn open_session(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(post_rpc(None, initialize_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(SESSION_HEADER)
        .expect("initialize must assign a session id")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_initialize_assigns_fresh_session_ids() {
    let router = test_router();

    let first = open_session(&router).await;
    let second = open_session(&router).await;
    assert_ne!(first, second);

    let response = router
        .clone()
        .oneshot(post_rpc(None, initialize_request()))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(body["result"]["serverInfo"]["name"], "meridian");
}

#[tokio::test]
async fn test_request_without_session_rejected() {
    let router = test_router();

    let response = router
        .clone()
        .oneshot(post_rpc(
            None,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("session required"));
}

#[tokio::test]
async fn test_unknown_session_rejected() {
    let router = test_router();

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some("not-a-session"),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_routes_follow_up_requests() {
    let router = test_router();
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["tools"][0]["name"], "get_context");

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tool_call_over_session() {
    let router = test_router();
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {
                    "name": "get_context",
                    "arguments": {
                        "product_id": "prod-missing",
                        "intent": "How is it doing?"
                    }
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(text, "Product not found: prod-missing");
}

#[tokio::test]
async fn test_unknown_tool_and_bad_arguments() {
    let router = test_router();
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": { "name": "get_weather", "arguments": {} }
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("unknown tool"));

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": { "name": "get_context", "arguments": { "intent": "hi" } }
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("invalid arguments"));
}

#[tokio::test]
async fn test_notifications_accepted_without_body() {
    let router = test_router();
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_terminated_session_is_forgotten() {
    let router = test_router();
    let session_id = open_session(&router).await;

    let delete = Request::builder()
        .method("DELETE")
        .uri("/mcp")
        .header(SESSION_HEADER, &session_id)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The id must not be resurrected.
    let response = router
        .clone()
        .oneshot(post_rpc(
            Some(&session_id),
            json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Terminating again reports not-found, never a crash.
    let delete = Request::builder()
        .method("DELETE")
        .uri("/mcp")
        .header(SESSION_HEADER, &session_id)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stream_requires_session() {
    let router = test_router();

    let get = Request::builder()
        .method("GET")
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let session_id = open_session(&router).await;
    let get = Request::builder()
        .method("GET")
        .uri("/mcp")
        .header(SESSION_HEADER, &session_id)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
}

#[tokio::test]
async fn test_health_and_info_endpoints() {
    let router = test_router();

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["name"], "meridian");
}
