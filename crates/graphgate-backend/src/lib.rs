//! # graphgate-backend
//!
//! Client side of the graph query backend.
//!
//! The proxy talks to the backend through the [`GraphBackend`] trait. Two
//! implementations ship with the crate:
//!
//! - [`HttpBackend`]: the production client over HTTP
//! - [`InMemoryBackend`]: a recording backend for tests and local demos
//!
//! Every call carries the backend API key. Calls made on behalf of a tenant
//! also carry the tenant and user as `x-tenant-id` / `x-user-id`.

pub mod error;
pub mod http;
pub mod memory;
pub mod request;

pub use error::BackendError;
pub use http::HttpBackend;
pub use memory::InMemoryBackend;
pub use request::{
    BackendRequest, GRAPHS_PATH, HEALTH_PATH, METADATA_PATH, Method, QUERY_PATH, TenantIdentity,
};

use async_trait::async_trait;
use serde_json::Value;

/// A graph query backend.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Perform one call and return the decoded JSON body.
    async fn call(&self, request: BackendRequest) -> Result<Value, BackendError>;
}
