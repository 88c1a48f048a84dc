//! # graphgate-mcp
//!
//! MCP (Model Context Protocol) server for graphgate.
//!
//! This crate exposes a graph query backend as four MCP tools and puts an
//! authentication gate in front of them:
//!
//! - **Request gate**: every protected request carries exactly one credential,
//!   verified into an [`AuthContext`](graphgate_core::AuthContext)
//! - **Tool router**: `query`, `listResources`, `serverInfo` and `health`,
//!   with tenant graph names rewritten before they reach the backend
//! - **HTTP transport**: JSON-RPC over `POST /mcp` plus an SSE channel
//!
//! ## Architecture
//!
//! ```text
//! MCP client
//!       │
//!       │ Authorization: Bearer …   or   ?token=…
//!       ▼
//! ┌────────────────────┐
//! │  graphgate         │
//! │  1. Verify token   │  ← graphgate-token
//! │  2. AuthContext    │
//! │  3. JSON-RPC       │
//! │  4. Rewrite names  │  ← graphgate-core isolation
//! │  5. Format result  │
//! └─────────┬──────────┘
//!           │ x-api-key, x-tenant-id, x-user-id
//!           ▼
//!     Graph query backend
//! ```
//!
//! ## Public endpoints
//!
//! | Path | Credential |
//! |------|------------|
//! | `GET /health` | none |
//! | `GET /.well-known/oauth-authorization-server` | none |
//! | `GET /.well-known/jwks.json` | none |
//! | `POST /mcp`, `GET /sse`, `POST /messages` | required |

pub mod discovery;
pub mod error;
pub mod format;
pub mod gate;
pub mod http_transport;
pub mod protocol;
pub mod router;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use gate::{GateState, SlotPolicy};
pub use http_transport::{AppState, HttpServer, create_router};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolContent,
    ToolDefinition,
};
pub use router::{ToolOutput, ToolRouter};
pub use server::McpServer;
pub use tools::ToolRegistry;
