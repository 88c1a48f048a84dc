//! Tenant isolation tests for graphgate.
//!
//! Tests multi-tenant graph isolation including:
//! - Graph name rewriting before the backend call
//! - Listing filtered to the tenant's own graphs
//! - Identity headers sent only for tenant callers
//! - Trusted callers seeing the backend unfiltered

use super::common::*;
use axum::http::Method;
use serde_json::json;

// =============================================================================
// QUERY REWRITING
// =============================================================================

pub async fn test_tenant_query_uses_prefixed_graph(ctx: &TestContext) {
    println!("  🧪 test_tenant_query_uses_prefixed_graph");
    ctx.reset_calls();

    let token = ctx.tenant_token("acme", "admin");
    let (text, is_error) = ctx
        .call_tool_as_tenant(
            &token,
            "query",
            json!({ "resourceName": "users", "queryText": "RETURN 1" }),
        )
        .await;

    assert!(!is_error, "query failed: {text}");
    assert!(text.starts_with("Query executed successfully on graph 'users' (tenant: acme):"));
    assert!(text.contains("**Result 1:**"));
    assert!(text.contains("- Provider: fake"));
    assert!(text.contains("- Tenant: acme"));

    let calls = ctx.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/api/mcp/context");
    assert_eq!(call.body.as_ref().unwrap()["graphName"], "acme_users");
    assert_eq!(call.body.as_ref().unwrap()["query"], "RETURN 1");
    assert_eq!(call.api_key.as_deref(), Some(BACKEND_API_KEY));
    assert_eq!(call.tenant.as_deref(), Some("acme"));
    assert_eq!(call.user.as_deref(), Some("admin"));

    println!("     ✓ Tenant query reached the backend as acme_users");
}

pub async fn test_same_name_different_tenants(ctx: &TestContext) {
    println!("  🧪 test_same_name_different_tenants");
    ctx.reset_calls();

    for (tenant, user) in [("acme", "admin"), ("widgets", "user1")] {
        let token = ctx.tenant_token(tenant, user);
        ctx.call_tool_as_tenant(
            &token,
            "query",
            json!({ "resourceName": "users", "queryText": "MATCH (n) RETURN n" }),
        )
        .await;
    }

    let graphs: Vec<String> = ctx
        .calls()
        .iter()
        .map(|c| c.body.as_ref().unwrap()["graphName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(graphs, vec!["acme_users", "widgets_users"]);

    println!("     ✓ Two tenants asking for 'users' hit different graphs");
}

pub async fn test_trusted_query_is_not_rewritten(ctx: &TestContext) {
    println!("  🧪 test_trusted_query_is_not_rewritten");
    ctx.reset_calls();

    let token = ctx.trusted_token();
    let (text, is_error) = ctx
        .call_tool_as_trusted(
            &token,
            "query",
            json!({ "resourceName": "widgets_users", "queryText": "RETURN 1" }),
        )
        .await;

    assert!(!is_error, "query failed: {text}");
    assert!(text.starts_with("Query executed successfully on graph 'widgets_users':"));

    let calls = ctx.calls();
    assert_eq!(calls[0].body.as_ref().unwrap()["graphName"], "widgets_users");
    assert_eq!(calls[0].api_key.as_deref(), Some(BACKEND_API_KEY));
    assert!(calls[0].tenant.is_none(), "trusted calls carry no tenant header");
    assert!(calls[0].user.is_none(), "trusted calls carry no user header");

    println!("     ✓ Trusted query passed the graph name through");
}

pub async fn test_invalid_query_arguments_skip_backend(ctx: &TestContext) {
    println!("  🧪 test_invalid_query_arguments_skip_backend");
    ctx.reset_calls();

    let token = ctx.tenant_token("acme", "admin");
    let (_, is_error) = ctx
        .call_tool_as_tenant(&token, "query", json!({ "resourceName": "users" }))
        .await;

    assert!(is_error);
    assert!(ctx.calls().is_empty());

    println!("     ✓ Query without queryText never reached the backend");
}

// =============================================================================
// LISTING
// =============================================================================

pub async fn test_tenant_listing_is_filtered(ctx: &TestContext) {
    println!("  🧪 test_tenant_listing_is_filtered");

    let token = ctx.tenant_token("acme", "admin");
    let (text, is_error) = ctx.call_tool_as_tenant(&token, "listResources", json!({})).await;

    assert!(!is_error);
    assert_eq!(text, "Available graphs (2):\n\n- users\n- orders");
    assert!(!text.contains("widgets"));

    let token = ctx.tenant_token("widgets", "user1");
    let (text, _) = ctx.call_tool_as_tenant(&token, "listResources", json!({})).await;
    assert_eq!(text, "Available graphs (1):\n\n- users");

    let token = ctx.tenant_token("globex", "admin");
    let (text, _) = ctx.call_tool_as_tenant(&token, "listResources", json!({})).await;
    assert_eq!(text, "No graphs found.");

    println!("     ✓ Each tenant sees only its own graphs, unprefixed");
}

pub async fn test_trusted_listing_is_unfiltered(ctx: &TestContext) {
    println!("  🧪 test_trusted_listing_is_unfiltered");

    let token = ctx.trusted_token();
    let (text, _) = ctx.call_tool_as_trusted(&token, "listResources", json!({})).await;

    assert_eq!(
        text,
        "Available graphs (3):\n\n- acme_users\n- widgets_users\n- acme_orders"
    );

    println!("     ✓ Trusted caller sees every backend graph");
}

// =============================================================================
// SERVER INFO AND HEALTH
// =============================================================================

pub async fn test_identity_in_info_and_health(ctx: &TestContext) {
    println!("  🧪 test_identity_in_info_and_health");
    ctx.reset_calls();

    let tenant = ctx.tenant_token("acme", "admin");
    let (text, _) = ctx.call_tool_as_tenant(&tenant, "serverInfo", json!({})).await;
    assert!(text.starts_with("**Graph Server Information:**"));
    assert!(text.contains("- Provider: fake"));
    assert!(text.contains("- Tenant: acme\n- User: admin"));

    let (text, _) = ctx.call_tool_as_tenant(&tenant, "health", json!({})).await;
    assert!(text.contains("- Overall Status: healthy"));
    assert!(text.contains("- Database Connected: true"));
    assert!(text.contains("- Tenant: acme"));

    let trusted = ctx.trusted_token();
    let (text, _) = ctx.call_tool_as_trusted(&trusted, "health", json!({})).await;
    assert!(!text.contains("Tenant:"));

    let calls = ctx.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].path, "/api/mcp/metadata");
    assert_eq!(calls[1].tenant.as_deref(), Some("acme"));
    assert_eq!(calls[2].path, "/health");
    assert!(calls[2].tenant.is_none());

    println!("     ✓ Identity shown and forwarded only for tenants");
}

// =============================================================================
// RUN ALL TESTS
// =============================================================================

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n🏢 Tenant Isolation Tests");

    test_tenant_query_uses_prefixed_graph(ctx).await;
    test_same_name_different_tenants(ctx).await;
    test_trusted_query_is_not_rewritten(ctx).await;
    test_invalid_query_arguments_skip_backend(ctx).await;
    test_tenant_listing_is_filtered(ctx).await;
    test_trusted_listing_is_unfiltered(ctx).await;
    test_identity_in_info_and_health(ctx).await;
}
