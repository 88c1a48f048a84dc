//! MCP server implementation.
//!
//! Dispatches JSON-RPC requests to the tool router. The caller's
//! [`AuthContext`] is passed into every request explicitly; the server
//! itself holds no per-caller state.

use crate::error::McpError;
use crate::protocol::*;
use crate::router::ToolRouter;
use crate::tools::ToolRegistry;
use graphgate_core::AuthContext;
use serde_json::{Value, json};

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "graphgate";

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    router: ToolRouter,
    tools: ToolRegistry,
}

impl McpServer {
    /// Create a server exposing the graph tools through `router`.
    pub fn new(router: ToolRouter) -> Self {
        Self {
            router,
            tools: ToolRegistry::builtin(),
        }
    }

    pub fn router(&self) -> &ToolRouter {
        &self.router
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle a JSON-RPC request. Notifications produce no response.
    pub async fn handle_request(
        &self,
        ctx: &AuthContext,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }

        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                "Invalid request: jsonrpc must be \"2.0\"",
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(ctx, id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(tools) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(
        &self,
        ctx: &AuthContext,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        tracing::info!(tool = %params.name, context = %ctx, "Calling tool");

        let output = match self.router.call(ctx, &params.name, &params.arguments).await {
            Ok(output) => output,
            Err(McpError::ToolNotFound { name }) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Tool not found: {}", name));
            }
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        };

        match serde_json::to_value(CallToolResponse::from(output)) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }
}
