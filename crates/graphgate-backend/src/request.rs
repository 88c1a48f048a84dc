//! Backend request model.

use graphgate_core::AuthContext;
use serde_json::Value;

/// Executes a query against one graph.
pub const QUERY_PATH: &str = "/api/mcp/context";

/// Lists every graph in the backend.
pub const GRAPHS_PATH: &str = "/api/mcp/graphs";

/// Backend provider, version and capabilities.
pub const METADATA_PATH: &str = "/api/mcp/metadata";

/// Backend health.
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Identity forwarded to the backend on behalf of a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantIdentity {
    pub tenant: String,
    pub user: String,
}

/// One call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    /// Present only for calls made under a tenant context.
    pub identity: Option<TenantIdentity>,
}

impl BackendRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            payload: None,
            identity: None,
        }
    }

    pub fn post(path: impl Into<String>, payload: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            payload: Some(payload),
            identity: None,
        }
    }

    /// Attach the tenant identity of `ctx`. Trusted contexts add nothing.
    pub fn with_identity_of(mut self, ctx: &AuthContext) -> Self {
        self.identity = match ctx {
            AuthContext::Tenant { tenant, user } => Some(TenantIdentity {
                tenant: tenant.clone(),
                user: user.clone(),
            }),
            AuthContext::Trusted { .. } => None,
        };
        self
    }

    /// Graph name in a query payload, if any.
    pub fn graph_name(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| p.get("graphName"))
            .and_then(Value::as_str)
    }
}
