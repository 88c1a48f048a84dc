//! Tool registry for MCP tools.
//!
//! The server exposes a fixed set of tools. Their names live here so
//! `tools/list` and the router's dispatch share one source.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::json;
use std::collections::HashMap;

pub const QUERY_TOOL: &str = "query";
pub const LIST_RESOURCES_TOOL: &str = "listResources";
pub const SERVER_INFO_TOOL: &str = "serverInfo";
pub const HEALTH_TOOL: &str = "health";

/// Registry of available MCP tools.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry holding the graph tools.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(query_tool());
        registry.register(list_resources_tool());
        registry.register(server_info_tool());
        registry.register(health_tool());
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// List all tools, ordered by name.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn read_only() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only_hint: Some(true),
    })
}

fn query_tool() -> ToolDefinition {
    ToolDefinition {
        name: QUERY_TOOL.to_string(),
        description: Some("Execute a Cypher query against a graph".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "resourceName": {
                    "type": "string",
                    "description": "Name of the graph to query"
                },
                "queryText": {
                    "type": "string",
                    "description": "Cypher query to execute"
                },
                "parameters": {
                    "type": "object",
                    "description": "Query parameters"
                }
            },
            "required": ["resourceName", "queryText"]
        }),
        annotations: None,
    }
}

fn list_resources_tool() -> ToolDefinition {
    ToolDefinition {
        name: LIST_RESOURCES_TOOL.to_string(),
        description: Some("List the graphs available to the caller".to_string()),
        input_schema: json!({ "type": "object", "properties": {} }),
        annotations: read_only(),
    }
}

fn server_info_tool() -> ToolDefinition {
    ToolDefinition {
        name: SERVER_INFO_TOOL.to_string(),
        description: Some("Get graph server metadata and capabilities".to_string()),
        input_schema: json!({ "type": "object", "properties": {} }),
        annotations: read_only(),
    }
}

fn health_tool() -> ToolDefinition {
    ToolDefinition {
        name: HEALTH_TOOL.to_string(),
        description: Some("Check graph server health status".to_string()),
        input_schema: json!({ "type": "object", "properties": {} }),
        annotations: read_only(),
    }
}
