//! Shared test infrastructure for graphgate end-to-end tests.
//!
//! This module provides:
//! - A fake graph backend on a local port that records every call
//! - Key material, token minting and the gated router under test
//! - Helper functions for requests and assertions

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
};
use futures::StreamExt;
use graphgate_backend::HttpBackend;
use graphgate_core::BackendConfig;
use graphgate_mcp::discovery::Discovery;
use graphgate_mcp::{AppState, McpServer, SlotPolicy, ToolRouter, create_router};
use graphgate_token::{KeyMaterial, TokenIssuer, TokenVerifier};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

// =============================================================================
// CONSTANTS
// =============================================================================

pub const ISSUER: &str = "https://graphgate.test";
pub const AUDIENCE: &str = "graphgate-mcp";
pub const BACKEND_API_KEY: &str = "e2e-api-key";

/// Graphs held by the fake backend.
pub const BACKEND_GRAPHS: &[&str] = &["acme_users", "widgets_users", "acme_orders"];

// =============================================================================
// FAKE BACKEND
// =============================================================================

/// One call received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub api_key: Option<String>,
    pub tenant: Option<String>,
    pub user: Option<String>,
    pub body: Option<Value>,
}

type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fake_backend(
    State(log): State<CallLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let path = uri.path().to_string();

    log.lock().unwrap().push(RecordedCall {
        method,
        path: path.clone(),
        api_key: header_text(&headers, "x-api-key"),
        tenant: header_text(&headers, "x-tenant-id"),
        user: header_text(&headers, "x-user-id"),
        body: body.clone(),
    });

    match path.as_str() {
        "/api/mcp/context" => {
            let graph = body
                .as_ref()
                .and_then(|b| b.get("graphName"))
                .cloned()
                .unwrap_or(Value::Null);
            (
                StatusCode::OK,
                Json(json!({
                    "data": { "data": [{ "graph": graph, "n": 1 }] },
                    "metadata": { "queryTime": 3, "provider": "fake" }
                })),
            )
        }
        "/api/mcp/graphs" => (
            StatusCode::OK,
            Json(json!({ "data": BACKEND_GRAPHS, "metadata": { "count": BACKEND_GRAPHS.len() } })),
        ),
        "/api/mcp/metadata" => (
            StatusCode::OK,
            Json(json!({
                "provider": "fake",
                "version": "1.0.0",
                "capabilities": ["cypher"],
                "tenant": headers.get("x-tenant-id").and_then(|v| v.to_str().ok()),
            })),
        ),
        "/health" => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "services": { "database": { "connected": true, "latency": 2 } }
            })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
    }
}

/// Start the fake backend on an ephemeral port. Returns its base URL.
async fn start_fake_backend(log: CallLog) -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| format!("Failed to bind fake backend: {}", e))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read fake backend address: {}", e))?;

    let app = Router::new().fallback(fake_backend).with_state(log);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", addr))
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

/// Everything an end-to-end test needs.
pub struct TestContext {
    pub keys: KeyMaterial,
    pub issuer: TokenIssuer,
    pub state: Arc<AppState>,
    pub backend_url: String,
    calls: CallLog,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let backend_url = start_fake_backend(calls.clone()).await?;

        let keys = KeyMaterial::generate();
        let issuer = TokenIssuer::new(&keys).map_err(|e| e.to_string())?;
        let verifier = TokenVerifier::new(&keys, ISSUER, AUDIENCE).map_err(|e| e.to_string())?;

        let backend = HttpBackend::new(&BackendConfig {
            url: backend_url.clone(),
            api_key: BACKEND_API_KEY.to_string(),
            api_key_env: None,
            timeout_secs: 5,
        })
        .map_err(|e| e.to_string())?;

        let router = ToolRouter::new(Arc::new(backend)).with_timeout(Duration::from_secs(5));
        let discovery = Discovery::new(&keys, ISSUER, "http://localhost:3001");
        let state = Arc::new(AppState::new(
            McpServer::new(router),
            Arc::new(verifier),
            discovery,
        ));

        Ok(Self {
            keys,
            issuer,
            state,
            backend_url,
            calls,
        })
    }

    /// The gated router, accepting credentials per `policy`.
    pub fn app(&self, policy: SlotPolicy) -> Router {
        create_router(self.state.clone(), policy)
    }

    pub fn tenant_token(&self, tenant: &str, user: &str) -> String {
        self.issuer.issue_tenant(tenant, user, 300).unwrap()
    }

    pub fn trusted_token(&self) -> String {
        self.issuer
            .issue_trusted("ops", ISSUER, AUDIENCE, &["read".to_string()], 300)
            .unwrap()
    }

    /// Forget previously recorded backend calls.
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Send a request through the gated router.
    pub async fn send(&self, policy: SlotPolicy, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.app(policy).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// Call a tool over `POST /mcp` with a tenant token. Returns the text result.
    pub async fn call_tool_as_tenant(&self, token: &str, name: &str, arguments: Value) -> (String, bool) {
        let request = rpc_request(
            &format!("/mcp?token={}", token),
            None,
            tool_call(1, name, arguments),
        );
        let (status, _, body) = self.send(SlotPolicy::Either, request).await;
        assert_eq!(status, StatusCode::OK, "unexpected status: {body}");
        tool_text(&body)
    }

    /// Call a tool over `POST /mcp` with a bearer token. Returns the text result.
    pub async fn call_tool_as_trusted(&self, token: &str, name: &str, arguments: Value) -> (String, bool) {
        let request = rpc_request("/mcp", Some(token), tool_call(1, name, arguments));
        let (status, _, body) = self.send(SlotPolicy::Either, request).await;
        assert_eq!(status, StatusCode::OK, "unexpected status: {body}");
        tool_text(&body)
    }
}

// =============================================================================
// REQUEST HELPERS
// =============================================================================

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

/// A JSON-RPC POST, optionally with a bearer token.
pub fn rpc_request(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Text and error flag of a `tools/call` result.
pub fn tool_text(response: &Value) -> (String, bool) {
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    let is_error = result["isError"].as_bool().unwrap_or(false);
    (text, is_error)
}

// =============================================================================
// SSE HELPERS
// =============================================================================

/// Reads server-sent events from a response body.
pub struct SseReader {
    stream: axum::body::BodyDataStream,
    buffer: String,
}

impl SseReader {
    pub fn new(body: Body) -> Self {
        Self {
            stream: body.into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next event as `(event, data)`, skipping keep-alive comments.
    pub async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = String::new();
                for line in raw.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data = value.trim().to_string();
                    }
                }
                if event.is_empty() && data.is_empty() {
                    continue;
                }
                return (event, data);
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("timed out waiting for SSE event")
                .expect("SSE stream ended")
                .expect("SSE stream failed");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

/// Session id from an `endpoint` event's data.
pub fn session_id_of(endpoint: &str) -> String {
    endpoint
        .split(['?', '&'])
        .find_map(|part| part.strip_prefix("session_id="))
        .unwrap_or_default()
        .to_string()
}
