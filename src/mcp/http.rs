//! Streamable HTTP transport.
//!
//! One endpoint, three verbs: POST delivers a JSON-RPC request
//! (creating a session when the payload is a valid `initialize` and no
//! session id is given), GET opens the session's server-event stream,
//! DELETE terminates the session. Session ids travel in the
//! `Mcp-Session-Id` header and are always server-generated.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::mcp::server::{GetContextParams, MeridianServer, SERVER_INSTRUCTIONS};
use crate::mcp::session::SessionRegistry;

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "Mcp-Session-Id";

/// Protocol revision answered when the client does not name one.
const PROTOCOL_VERSION: &str = "2025-03-26";

const GET_CONTEXT_DESCRIPTION: &str = "Get synthesized context about a \
product's AI-search visibility. Routes the request to the relevant data \
zones and answers grounded in their records.";

/// Shared state for the HTTP transport.
pub struct HttpState {
    server: MeridianServer,
    registry: Arc<SessionRegistry>,
}

/// Inbound JSON-RPC request envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    /// Absent for notifications.
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Build the transport router.
///
/// The session registry is injected so its lifetime and visibility are
/// explicit; nothing else holds a reference to it.
pub fn create_router(server: MeridianServer, registry: Arc<SessionRegistry>) -> Router {
    let state = Arc::new(HttpState { server, registry });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any)
        .expose_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .route(
            "/mcp",
            axum::routing::post(handle_post)
                .get(handle_stream)
                .delete(handle_delete),
        )
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Root handler with basic info.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "meridian",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Product context MCP server",
        "endpoints": {
            "health": "/health",
            "mcp": "/mcp"
        }
    }))
}

async fn handle_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(session_id) = session_id else {
        // No session: only a valid initialization may create one.
        if request.method != "initialize" {
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc_error(
                    request.id.as_ref(),
                    -32000,
                    "session required: send an initialize request first",
                )),
            )
                .into_response();
        }

        let session = state.registry.create().await;
        debug!(session_id = %session.id(), "session initialized");

        let requested_version = request
            .params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        let result = json!({
            "protocolVersion": requested_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "meridian",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "instructions": SERVER_INSTRUCTIONS,
        });

        return (
            StatusCode::OK,
            [(SESSION_HEADER, session.id().to_string())],
            Json(rpc_result(request.id.as_ref(), result)),
        )
            .into_response();
    };

    let Some(session) = state.registry.get(session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(rpc_error(
                request.id.as_ref(),
                -32001,
                "invalid or terminated session",
            )),
        )
            .into_response();
    };

    // Notifications get no response body.
    if request.id.is_none() {
        debug!(session_id, method = %request.method, "notification accepted");
        return StatusCode::ACCEPTED.into_response();
    }

    // One logical exchange at a time per session; other sessions
    // proceed independently.
    let _exchange = session.begin_exchange().await;

    let body = match request.method.as_str() {
        "initialize" => rpc_error(
            request.id.as_ref(),
            -32600,
            "session already initialized",
        ),
        "ping" => rpc_result(request.id.as_ref(), json!({})),
        "tools/list" => rpc_result(
            request.id.as_ref(),
            json!({ "tools": [tool_descriptor()] }),
        ),
        "tools/call" => {
            let name = request.params.get("name").and_then(Value::as_str);
            if name != Some("get_context") {
                rpc_error(
                    request.id.as_ref(),
                    -32602,
                    &format!("unknown tool: {}", name.unwrap_or("<missing>")),
                )
            } else {
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));

                match serde_json::from_value::<GetContextParams>(arguments) {
                    Err(e) => rpc_error(
                        request.id.as_ref(),
                        -32602,
                        &format!("invalid arguments: {e}"),
                    ),
                    Ok(params) => {
                        let text = state.server.get_context_text(&params).await;
                        session.send_event(json!({
                            "jsonrpc": "2.0",
                            "method": "notifications/message",
                            "params": {
                                "level": "info",
                                "data": format!("get_context completed for {}", params.product_id),
                            }
                        }));
                        rpc_result(
                            request.id.as_ref(),
                            json!({
                                "content": [{ "type": "text", "text": text }],
                                "isError": false,
                            }),
                        )
                    }
                }
            }
        }
        other => rpc_error(
            request.id.as_ref(),
            -32601,
            &format!("method not found: {other}"),
        ),
    };

    (StatusCode::OK, Json(body)).into_response()
}

async fn handle_stream(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    let Some(session_id) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "session required" })),
        )
            .into_response();
    };

    let Some(session) = state.registry.get(session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "invalid or terminated session" })),
        )
            .into_response();
    };

    let Some(receiver) = session.take_event_stream().await else {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "event stream already open for this session" })),
        )
            .into_response();
    };

    let stream = UnboundedReceiverStream::new(receiver)
        .map(|event| Ok::<Event, Infallible>(Event::default().event("message").data(event.to_string())));

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn handle_delete(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    let Some(session_id) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "session required" })),
        )
            .into_response();
    };

    if state.registry.remove(session_id).await {
        debug!(session_id, "session terminated");
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "session not found" })),
        )
            .into_response()
    }
}

fn tool_descriptor() -> Value {
    json!({
        "name": "get_context",
        "description": GET_CONTEXT_DESCRIPTION,
        "inputSchema": {
            "type": "object",
            "properties": {
                "product_id": {
                    "type": "string",
                    "description": "Product to answer about"
                },
                "intent": {
                    "type": "string",
                    "description": "Natural-language request"
                },
                "query_filter": {
                    "type": "string",
                    "description": "Keyword filter overriding whatever the classifier extracts"
                }
            },
            "required": ["product_id", "intent"]
        }
    })
}

fn rpc_result(id: Option<&Value>, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id.cloned().unwrap_or(Value::Null),
        "result": result,
    })
}

fn rpc_error(id: Option<&Value>, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id.cloned().unwrap_or(Value::Null),
        "error": { "code": code, "message": message },
    })
}
