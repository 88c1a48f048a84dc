//! Request gate tests for graphgate.
//!
//! Tests authentication at the HTTP boundary including:
//! - Missing, malformed and forged credentials
//! - Credential slot policies per listener
//! - Public endpoints reachable without a credential
//! - Unknown paths rejected before routing

use super::common::*;
use axum::http::{StatusCode, header};
use graphgate_mcp::{HttpServer, SlotPolicy};
use graphgate_token::{KeyMaterial, TokenIssuer};
use serde_json::json;
use tokio::net::TcpListener;

fn ping() -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" })
}

// =============================================================================
// REJECTIONS
// =============================================================================

pub async fn test_missing_credential_rejected(ctx: &TestContext) {
    println!("  🧪 test_missing_credential_rejected");
    ctx.reset_calls();

    let request = rpc_request("/mcp", None, tool_call(1, "listResources", json!({})));
    let (status, headers, body) = ctx.send(SlotPolicy::Either, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer realm=\"graphgate\"");
    assert_eq!(body, json!({ "error": "unauthorized" }));
    assert!(ctx.calls().is_empty(), "backend must not be called");

    println!("     ✓ Missing credential gets 401 without a backend call");
}

pub async fn test_invalid_credentials_look_alike(ctx: &TestContext) {
    println!("  🧪 test_invalid_credentials_look_alike");
    ctx.reset_calls();

    let foreign = TokenIssuer::new(&KeyMaterial::generate()).unwrap();
    let tampered = {
        let token = ctx.tenant_token("acme", "admin");
        let (rest, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { 'B' } else { 'A' };
        format!("{}.{}{}", rest, flipped, &sig[1..])
    };

    let cases = [
        ("garbage", "not-a-token".to_string()),
        ("foreign key", foreign.issue_tenant("acme", "admin", 300).unwrap()),
        ("tampered", tampered),
        ("trusted token in query", ctx.trusted_token()),
    ];

    for (label, token) in cases {
        let request = rpc_request(&format!("/mcp?token={}", token), None, ping());
        let (status, headers, body) = ctx.send(SlotPolicy::Either, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{label}");
        assert_eq!(
            headers[header::WWW_AUTHENTICATE],
            "Bearer realm=\"graphgate\", error=\"invalid_token\"",
            "{label}"
        );
        assert_eq!(body, json!({ "error": "unauthorized" }), "{label}");
    }

    let tenant_as_bearer = ctx.tenant_token("acme", "admin");
    let request = rpc_request("/mcp", Some(&tenant_as_bearer), ping());
    let (status, _, _) = ctx.send(SlotPolicy::Either, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(ctx.calls().is_empty(), "backend must not be called");
    println!("     ✓ Every invalid credential gets the same 401");
}

pub async fn test_both_slots_rejected(ctx: &TestContext) {
    println!("  🧪 test_both_slots_rejected");

    let tenant = ctx.tenant_token("acme", "admin");
    let trusted = ctx.trusted_token();
    let request = rpc_request(&format!("/mcp?token={}", tenant), Some(&trusted), ping());
    let (status, _, _) = ctx.send(SlotPolicy::Either, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    println!("     ✓ A request carrying two credentials is rejected");
}

// =============================================================================
// SLOT POLICIES
// =============================================================================

pub async fn test_listener_slot_policies(ctx: &TestContext) {
    println!("  🧪 test_listener_slot_policies");

    let tenant = ctx.tenant_token("acme", "admin");
    let trusted = ctx.trusted_token();

    let (status, _, _) = ctx
        .send(SlotPolicy::HeaderOnly, rpc_request("/mcp", Some(&trusted), ping()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = ctx
        .send(
            SlotPolicy::HeaderOnly,
            rpc_request(&format!("/mcp?token={}", tenant), None, ping()),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = ctx
        .send(
            SlotPolicy::QueryOnly,
            rpc_request(&format!("/mcp?token={}", tenant), None, ping()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = ctx
        .send(SlotPolicy::QueryOnly, rpc_request("/mcp", Some(&trusted), ping()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    println!("     ✓ Each listener accepts only its own credential slot");
}

// =============================================================================
// PUBLIC ENDPOINTS AND FAIL-CLOSED ROUTING
// =============================================================================

pub async fn test_public_endpoints(ctx: &TestContext) {
    println!("  🧪 test_public_endpoints");

    let (status, _, body) = ctx.send(SlotPolicy::HeaderOnly, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _, body) = ctx
        .send(
            SlotPolicy::HeaderOnly,
            get_request("/.well-known/oauth-authorization-server"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issuer"], ISSUER);
    assert!(body["authorization_endpoint"].is_string());
    assert!(body["token_endpoint"].is_string());

    let (status, _, body) = ctx
        .send(SlotPolicy::QueryOnly, get_request("/.well-known/jwks.json"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"][0]["kid"], ctx.keys.key_id());
    assert_eq!(body["keys"][0]["crv"], "Ed25519");

    println!("     ✓ Health and discovery need no credential");
}

pub async fn test_unknown_paths_are_gated(ctx: &TestContext) {
    println!("  🧪 test_unknown_paths_are_gated");

    let (status, _, _) = ctx.send(SlotPolicy::Either, get_request("/admin")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = ctx
        .send(SlotPolicy::Either, get_request("/health/../admin"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = ctx.tenant_token("acme", "admin");
    let (status, _, _) = ctx
        .send(SlotPolicy::Either, get_request(&format!("/admin?token={}", token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    println!("     ✓ Unknown paths answer 401 until authenticated");
}

// =============================================================================
// REAL LISTENER
// =============================================================================

pub async fn test_http_server_on_socket(ctx: &TestContext) {
    println!("  🧪 test_http_server_on_socket");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server = HttpServer::new(ctx.state.clone(), SlotPolicy::Either);
    let handle = tokio::spawn(server.serve(listener, async move {
        let _ = shutdown_rx.await;
    }));

    let client = reqwest::Client::new();
    let health = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status().as_u16(), 200);

    let rejected = client
        .post(format!("http://{}/mcp", addr))
        .json(&ping())
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 401);
    assert!(rejected.headers().contains_key("www-authenticate"));

    let accepted = client
        .post(format!("http://{}/mcp", addr))
        .bearer_auth(ctx.trusted_token())
        .json(&ping())
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 200);

    drop(client);
    let _ = shutdown_tx.send(());
    handle.await.unwrap().unwrap();

    println!("     ✓ Server answers on a real socket and shuts down cleanly");
}

// =============================================================================
// RUN ALL TESTS
// =============================================================================

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n🔐 Request Gate Tests");

    test_missing_credential_rejected(ctx).await;
    test_invalid_credentials_look_alike(ctx).await;
    test_both_slots_rejected(ctx).await;
    test_listener_slot_policies(ctx).await;
    test_public_endpoints(ctx).await;
    test_unknown_paths_are_gated(ctx).await;
    test_http_server_on_socket(ctx).await;
}
