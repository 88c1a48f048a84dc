//! HTTP transport for MCP server.
//!
//! This module provides an HTTP/SSE transport for the MCP server:
//!
//! - `POST /mcp`: one JSON-RPC request, answered in the HTTP response
//! - `GET /sse`: event stream; the first `endpoint` event names the URL to
//!   POST messages to, and responses arrive as `message` events
//! - `POST /messages?session_id=…`: JSON-RPC request for an SSE session
//!
//! Every route sits behind the request gate, which lets the public paths
//! through without a credential.

use crate::discovery::Discovery;
use crate::error::McpError;
use crate::gate::{GateState, SlotPolicy, TOKEN_PARAM, require_auth};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::server::McpServer;
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Query, State, rejection::JsonRejection},
    http::{Request, StatusCode, Uri},
    middleware,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use graphgate_core::AuthContext;
use graphgate_token::TokenVerifier;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Pending responses buffered per SSE session.
const SESSION_BUFFER: usize = 100;

/// Interval between SSE keep-alive comments.
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// An open SSE session and the identity that opened it.
struct Session {
    tx: mpsc::Sender<JsonRpcResponse>,
    owner: AuthContext,
}

/// Shared state of the HTTP transport.
pub struct AppState {
    server: McpServer,
    verifier: Arc<TokenVerifier>,
    discovery: Discovery,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AppState {
    pub fn new(server: McpServer, verifier: Arc<TokenVerifier>, discovery: Discovery) -> Self {
        Self {
            server,
            verifier,
            discovery,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of open SSE sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    fn open_session(&self, id: String, session: Session) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(id, session);
        }
    }

    fn close_session(&self, id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(id);
        }
    }

    /// Sender of a session, if it exists and belongs to `ctx`.
    fn session_sender(&self, id: &str, ctx: &AuthContext) -> Option<mpsc::Sender<JsonRpcResponse>> {
        let sessions = self.sessions.read().ok()?;
        sessions
            .get(id)
            .filter(|session| &session.owner == ctx)
            .map(|session| session.tx.clone())
    }
}

/// Removes a session when its event stream is dropped.
struct SessionGuard {
    state: Arc<AppState>,
    id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.close_session(&self.id);
        tracing::debug!(session_id = %self.id, "SSE session closed");
    }
}

/// Query parameters for the SSE message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: String,
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<AppState>, policy: SlotPolicy) -> Router {
    let gate = GateState::new(state.verifier.clone(), policy);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/.well-known/oauth-authorization-server",
            get(handle_authorization_server_metadata),
        )
        .route("/.well-known/jwks.json", get(handle_jwks))
        .route("/mcp", post(handle_mcp_post))
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_message))
        .fallback(handle_not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(gate, require_auth))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

/// Span for one HTTP request. Records the path only, since the query string
/// may carry a tenant token.
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return parse_error(rejection),
    };

    match state.server.handle_request(&ctx, request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle GET requests to /sse (SSE streaming).
async fn handle_sse(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    uri: Uri,
) -> impl IntoResponse {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel(SESSION_BUFFER);

    state.open_session(
        session_id.clone(),
        Session {
            tx,
            owner: ctx.clone(),
        },
    );
    tracing::info!(session_id = %session_id, context = %ctx, "SSE session opened");

    let endpoint = message_endpoint(&session_id, &uri);
    let guard = SessionGuard {
        state: state.clone(),
        id: session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));

        while let Some(response) = rx.recv().await {
            let data = serde_json::to_string(&response).unwrap_or_default();
            yield Ok(Event::default().event("message").data(data));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("ping"))
}

/// Handle POST requests to /messages (JSON-RPC for an SSE session).
async fn handle_message(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<MessageQuery>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    // Sessions opened by someone else look the same as missing ones.
    let Some(tx) = state.session_sender(&query.session_id, &ctx) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unknown session" })),
        )
            .into_response();
    };

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return parse_error(rejection),
    };

    if let Some(response) = state.server.handle_request(&ctx, request).await {
        if tx.send(response).await.is_err() {
            return StatusCode::GONE.into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "graphgate",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_authorization_server_metadata(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.discovery.metadata())
}

async fn handle_jwks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.discovery.jwks().clone())
}

async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}

fn parse_error(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonRpcResponse::error(
            None,
            PARSE_ERROR,
            format!("Parse error: {}", rejection.body_text()),
        )),
    )
        .into_response()
}

/// Where an SSE client posts its messages.
///
/// Tenant clients authenticate through the URL, so their token is carried
/// over to the message endpoint.
fn message_endpoint(session_id: &str, sse_uri: &Uri) -> String {
    let token = Query::<HashMap<String, String>>::try_from_uri(sse_uri)
        .ok()
        .and_then(|Query(params)| params.get(TOKEN_PARAM).cloned());

    match token {
        Some(token) => format!("/messages?session_id={}&{}={}", session_id, TOKEN_PARAM, token),
        None => format!("/messages?session_id={}", session_id),
    }
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    router: Router,
    policy: SlotPolicy,
}

impl HttpServer {
    /// Create a new HTTP server accepting the credentials allowed by `policy`.
    pub fn new(state: Arc<AppState>, policy: SlotPolicy) -> Self {
        Self {
            router: create_router(state, policy),
            policy,
        }
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn run<F>(self, addr: &str, shutdown: F) -> Result<(), McpError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), McpError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, policy = ?self.policy, "MCP HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))
    }
}
