//! Tool execution against the graph backend.
//!
//! Every operation takes the caller's [`AuthContext`] explicitly. Graph names
//! are rewritten with the isolation policy before a request leaves the
//! proxy, and tenant identity headers are attached for tenant callers.
//! Backend failures never escape: they become error text in the tool result.

use crate::error::McpError;
use crate::format;
use crate::protocol::{CallToolResponse, ToolContent};
use crate::tools::{HEALTH_TOOL, LIST_RESOURCES_TOOL, QUERY_TOOL, SERVER_INFO_TOOL};
use graphgate_backend::{
    BackendError, BackendRequest, GRAPHS_PATH, GraphBackend, HEALTH_PATH, METADATA_PATH,
    QUERY_PATH,
};
use graphgate_core::config::backend::MAX_TIMEOUT_SECS;
use graphgate_core::{AuthContext, resolve_backend_name};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Text produced by a tool, and whether it reports a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<ToolOutput> for CallToolResponse {
    fn from(output: ToolOutput) -> Self {
        CallToolResponse {
            content: vec![ToolContent::Text { text: output.text }],
            is_error: Some(output.is_error),
        }
    }
}

/// Runs the graph tools for one proxy instance.
#[derive(Clone)]
pub struct ToolRouter {
    backend: Arc<dyn GraphBackend>,
    timeout: Duration,
}

impl ToolRouter {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(MAX_TIMEOUT_SECS),
        }
    }

    /// Bound every backend call, clamped to 1..=30 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.clamp(
            Duration::from_secs(1),
            Duration::from_secs(MAX_TIMEOUT_SECS),
        );
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Dispatch a `tools/call` by tool name.
    pub async fn call(
        &self,
        ctx: &AuthContext,
        name: &str,
        arguments: &Value,
    ) -> Result<ToolOutput, McpError> {
        match name {
            QUERY_TOOL => Ok(self.call_query(ctx, arguments).await),
            LIST_RESOURCES_TOOL => Ok(self.list_resources(ctx).await),
            SERVER_INFO_TOOL => Ok(self.server_info(ctx).await),
            HEALTH_TOOL => Ok(self.health(ctx).await),
            other => Err(McpError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }

    async fn call_query(&self, ctx: &AuthContext, arguments: &Value) -> ToolOutput {
        let args = match QueryArgs::parse(arguments) {
            Ok(args) => args,
            Err(err) => return ToolOutput::error(err.to_string()),
        };
        self.execute_query(ctx, &args.resource_name, &args.query_text, args.parameters)
            .await
    }

    /// Run a query against the caller's view of `resource_name`.
    pub async fn execute_query(
        &self,
        ctx: &AuthContext,
        resource_name: &str,
        query_text: &str,
        parameters: Option<Map<String, Value>>,
    ) -> ToolOutput {
        let backend_name = resolve_backend_name(ctx, resource_name);
        tracing::info!(
            graph = %resource_name,
            backend_graph = %backend_name,
            auth = ?ctx.kind(),
            user = %ctx.user_id(),
            "Executing query"
        );

        let payload = json!({
            "graphName": backend_name,
            "query": query_text,
            "parameters": Value::Object(parameters.unwrap_or_default()),
        });

        match self.send(ctx, BackendRequest::post(QUERY_PATH, payload)).await {
            Ok(body) => ToolOutput::ok(format::query_result(ctx, resource_name, &body)),
            Err(err) => {
                tracing::warn!(graph = %resource_name, error = %err, "Query failed");
                ToolOutput::error(format::query_error(ctx, resource_name, err))
            }
        }
    }

    /// List the graphs the caller may see.
    pub async fn list_resources(&self, ctx: &AuthContext) -> ToolOutput {
        match self.send(ctx, BackendRequest::get(GRAPHS_PATH)).await {
            Ok(body) => ToolOutput::ok(format::graph_list(ctx, &body)),
            Err(err) => ToolOutput::error(format::tool_error(ctx, "listing graphs", err)),
        }
    }

    /// Backend provider, version and capabilities.
    pub async fn server_info(&self, ctx: &AuthContext) -> ToolOutput {
        match self.send(ctx, BackendRequest::get(METADATA_PATH)).await {
            Ok(body) => ToolOutput::ok(format::server_info(ctx, &body)),
            Err(err) => ToolOutput::error(format::tool_error(ctx, "getting server info", err)),
        }
    }

    /// Backend health and connectivity.
    pub async fn health(&self, ctx: &AuthContext) -> ToolOutput {
        match self.send(ctx, BackendRequest::get(HEALTH_PATH)).await {
            Ok(body) => ToolOutput::ok(format::health(ctx, &body)),
            Err(err) => ToolOutput::error(format::tool_error(ctx, "checking health", err)),
        }
    }

    async fn send(
        &self,
        ctx: &AuthContext,
        request: BackendRequest,
    ) -> Result<Value, BackendError> {
        let request = request.with_identity_of(ctx);
        match tokio::time::timeout(self.timeout, self.backend.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Unavailable(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// Validated arguments of the `query` tool.
#[derive(Debug)]
struct QueryArgs {
    resource_name: String,
    query_text: String,
    parameters: Option<Map<String, Value>>,
}

impl QueryArgs {
    fn parse(arguments: &Value) -> Result<Self, McpError> {
        let invalid = |reason: &str| McpError::InvalidArguments {
            tool: QUERY_TOOL.to_string(),
            reason: reason.to_string(),
        };

        let resource_name = non_empty_str(arguments, "resourceName")
            .ok_or_else(|| invalid("resourceName must be a non-empty string"))?;
        let query_text = non_empty_str(arguments, "queryText")
            .ok_or_else(|| invalid("queryText must be a non-empty string"))?;
        let parameters = match arguments.get("parameters") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => return Err(invalid("parameters must be an object")),
        };

        Ok(Self {
            resource_name,
            query_text,
            parameters,
        })
    }
}

fn non_empty_str(arguments: &Value, key: &str) -> Option<String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
