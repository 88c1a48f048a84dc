//! Request gate: credential extraction and verification.
//!
//! Every request outside [`PUBLIC_PATHS`] must carry exactly one credential
//! that verifies. On success the resulting
//! [`AuthContext`](graphgate_core::AuthContext) is inserted into
//! the request extensions for handlers to take as `Extension<AuthContext>`.
//! On any failure the request ends here with the same 401 response, so a
//! client cannot tell an expired token from a forged one.

use axum::{
    Json,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use graphgate_token::{AuthError, Credential, TokenVerifier};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Paths reachable without a credential.
pub const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/.well-known/oauth-authorization-server",
    "/.well-known/jwks.json",
];

/// Query parameter carrying a tenant token.
pub const TOKEN_PARAM: &str = "token";

const REALM: &str = "graphgate";

/// Which credential slots a listener accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Only `Authorization: Bearer`. Used by the trusted listener.
    HeaderOnly,
    /// Only `?token=`. Used by the tenant listener.
    QueryOnly,
    /// Either slot, but not both at once.
    Either,
}

/// State of the gate middleware.
#[derive(Clone)]
pub struct GateState {
    pub verifier: Arc<TokenVerifier>,
    pub policy: SlotPolicy,
}

impl GateState {
    pub fn new(verifier: Arc<TokenVerifier>, policy: SlotPolicy) -> Self {
        Self { verifier, policy }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Axum middleware enforcing authentication on protected paths.
pub async fn require_auth(State(gate): State<GateState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(req).await;
    }

    let verified = extract_credential(req.headers(), req.uri(), gate.policy)
        .and_then(|credential| gate.verifier.verify(&credential));

    match verified {
        Ok(ctx) => {
            tracing::debug!(
                path = %path,
                auth = ?ctx.kind(),
                tenant = ctx.tenant_id().unwrap_or("-"),
                user = %ctx.user_id(),
                "Request authenticated"
            );
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(path = %path, error = err.class(), "Request rejected");
            unauthorized(&err)
        }
    }
}

/// Pick the credential allowed by `policy` out of a request.
pub fn extract_credential(
    headers: &HeaderMap,
    uri: &Uri,
    policy: SlotPolicy,
) -> Result<Credential, AuthError> {
    match policy {
        SlotPolicy::HeaderOnly => bearer_token(headers)?
            .map(Credential::HeaderBearer)
            .ok_or(AuthError::MissingCredential),
        SlotPolicy::QueryOnly => query_token(uri)?
            .map(Credential::QueryToken)
            .ok_or(AuthError::MissingCredential),
        SlotPolicy::Either => match (bearer_token(headers)?, query_token(uri)?) {
            (Some(_), Some(_)) => Err(AuthError::MalformedToken),
            (Some(token), None) => Ok(Credential::HeaderBearer(token)),
            (None, Some(token)) => Ok(Credential::QueryToken(token)),
            (None, None) => Err(AuthError::MissingCredential),
        },
    }
}

/// Token from `Authorization: Bearer <token>`, if the header is present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(Some(token.to_string()))
}

/// Token from the `token` query parameter, if present.
fn query_token(uri: &Uri) -> Result<Option<String>, AuthError> {
    if uri.query().is_none() {
        return Ok(None);
    }
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|_| AuthError::MalformedToken)?;
    Ok(params.get(TOKEN_PARAM).cloned())
}

/// The single rejection response of the gate.
pub fn unauthorized(err: &AuthError) -> Response {
    let challenge = match err {
        AuthError::MissingCredential => format!("Bearer realm=\"{}\"", REALM),
        _ => format!("Bearer realm=\"{}\", error=\"invalid_token\"", REALM),
    };

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge)],
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}
