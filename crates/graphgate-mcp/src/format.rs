//! Text rendering of backend responses.
//!
//! Tool results are plain text aimed at a language model. Graph names shown
//! here are always the names the caller asked for or may see, never another
//! tenant's backend names.

use graphgate_core::isolation::tenant_prefix;
use graphgate_core::{AuthContext, visible_names};
use serde_json::Value;
use std::fmt::Display;

/// Render a JSON value the way a person would write it.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn field_text(body: &Value, key: &str, fallback: &str) -> String {
    body.get(key)
        .filter(|v| !v.is_null())
        .map(value_text)
        .unwrap_or_else(|| fallback.to_string())
}

/// ` (tenant: acme)` for tenant contexts, empty otherwise.
fn tenant_suffix(ctx: &AuthContext) -> String {
    match ctx.tenant_id() {
        Some(tenant) => format!(" (tenant: {})", tenant),
        None => String::new(),
    }
}

fn identity_lines(ctx: &AuthContext) -> String {
    match ctx {
        AuthContext::Tenant { tenant, user } => format!("\n- Tenant: {}\n- User: {}", tenant, user),
        AuthContext::Trusted { .. } => String::new(),
    }
}

/// Render a query response.
///
/// Rows come from `data.data` and keep the key order the backend used.
pub fn query_result(ctx: &AuthContext, requested: &str, body: &Value) -> String {
    let suffix = tenant_suffix(ctx);

    let Some(rows) = body
        .get("data")
        .and_then(|d| d.get("data"))
        .and_then(Value::as_array)
    else {
        return format!(
            "Query executed on graph '{}'{} but unexpected response format.",
            requested, suffix
        );
    };

    if rows.is_empty() {
        return format!(
            "Query executed successfully on graph '{}'{} with no results returned.",
            requested, suffix
        );
    }

    let blocks: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut block = format!("**Result {}:**\n", i + 1);
            match row.as_object() {
                Some(fields) => {
                    for (key, value) in fields {
                        block.push_str(&format!("- {}: {}\n", key, value_text(value)));
                    }
                }
                None => block.push_str(&format!("- value: {}\n", value_text(row))),
            }
            block
        })
        .collect();

    let mut text = format!(
        "Query executed successfully on graph '{}'{}:\n\n{}",
        requested,
        suffix,
        blocks.join("\n")
    );

    let mut metadata = Vec::new();
    if let Some(meta) = body.get("metadata").filter(|m| m.is_object()) {
        metadata.push(format!("- Query time: {}ms", field_text(meta, "queryTime", "N/A")));
        metadata.push(format!("- Provider: {}", field_text(meta, "provider", "N/A")));
    }
    if let Some(tenant) = ctx.tenant_id() {
        metadata.push(format!("- Tenant: {}", tenant));
    }
    if !metadata.is_empty() {
        text.push_str("\n**Metadata:**\n");
        text.push_str(&metadata.join("\n"));
    }

    text
}

/// Render a graph listing, keeping only names visible to `ctx`.
pub fn graph_list(ctx: &AuthContext, body: &Value) -> String {
    let Some(entries) = body.get("data").and_then(Value::as_array) else {
        return "Unexpected response format from backend.".to_string();
    };

    let backend_names = entries.iter().filter_map(|entry| match entry {
        Value::String(name) => Some(name.clone()),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    });
    let names = visible_names(ctx, backend_names);

    if names.is_empty() {
        return "No graphs found.".to_string();
    }

    let lines: Vec<String> = names.iter().map(|name| format!("- {}", name)).collect();
    format!("Available graphs ({}):\n\n{}", names.len(), lines.join("\n"))
}

/// Render backend metadata.
pub fn server_info(ctx: &AuthContext, body: &Value) -> String {
    let capabilities = body
        .get("capabilities")
        .and_then(Value::as_array)
        .map(|caps| caps.iter().map(value_text).collect::<Vec<_>>())
        .filter(|caps| !caps.is_empty())
        .map(|caps| caps.join(", "))
        .unwrap_or_else(|| "None listed".to_string());

    format!(
        "**Graph Server Information:**\n\n- Provider: {}\n- Version: {}\n- Capabilities: {}{}",
        field_text(body, "provider", "Unknown"),
        field_text(body, "version", "Unknown"),
        capabilities,
        identity_lines(ctx)
    )
}

/// Render backend health.
pub fn health(ctx: &AuthContext, body: &Value) -> String {
    let database = body
        .get("services")
        .and_then(|s| s.get("database"))
        .cloned()
        .unwrap_or(Value::Null);

    format!(
        "**Graph Health Status:**\n\n- Overall Status: {}\n- Database Connected: {}\n- Database Latency: {}ms{}",
        field_text(body, "status", "unknown"),
        field_text(&database, "connected", "Unknown"),
        field_text(&database, "latency", "Unknown"),
        identity_lines(ctx)
    )
}

/// Backend error text as a tenant may see it, with its prefix removed.
fn error_text(ctx: &AuthContext, err: impl Display) -> String {
    let text = err.to_string();
    match ctx.tenant_id() {
        Some(tenant) => text.replace(&tenant_prefix(tenant), ""),
        None => text,
    }
}

/// Error text for a failed query, naming the graph as the caller asked for it.
pub fn query_error(ctx: &AuthContext, requested: &str, err: impl Display) -> String {
    format!(
        "Error executing query on graph '{}' ({}): {}",
        requested,
        ctx,
        error_text(ctx, err)
    )
}

/// Error text for the other tools, e.g. `action = "listing graphs"`.
pub fn tool_error(ctx: &AuthContext, action: &str, err: impl Display) -> String {
    format!("Error {} ({}): {}", action, ctx, error_text(ctx, err))
}
