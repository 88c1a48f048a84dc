//! In-memory [`GraphBackend`] that records every call.

use crate::error::BackendError;
use crate::request::{BackendRequest, GRAPHS_PATH, HEALTH_PATH, METADATA_PATH, QUERY_PATH};
use crate::GraphBackend;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Serves canned responses per path and keeps a log of requests.
///
/// Unless overridden, graph listings come from the configured graph names,
/// queries return no rows, and metadata/health describe a healthy backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    graphs: Vec<String>,
    responses: HashMap<String, Value>,
    failures: HashMap<String, BackendError>,
    delay: Option<Duration>,
    calls: RwLock<Vec<BackendRequest>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph names returned by the listing endpoint.
    pub fn with_graphs<I, S>(mut self, graphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graphs = graphs.into_iter().map(Into::into).collect();
        self
    }

    /// Fixed response body for `path`.
    pub fn with_response(mut self, path: impl Into<String>, body: Value) -> Self {
        self.responses.insert(path.into(), body);
        self
    }

    /// Make every call to `path` fail.
    pub fn with_failure(mut self, path: impl Into<String>, error: BackendError) -> Self {
        self.failures.insert(path.into(), error);
        self
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<BackendRequest> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().map(|c| c.len()).unwrap_or_default()
    }

    fn default_response(&self, path: &str) -> Option<Value> {
        match path {
            GRAPHS_PATH => Some(json!({
                "data": self.graphs,
                "metadata": { "count": self.graphs.len() }
            })),
            QUERY_PATH => Some(json!({
                "data": { "data": [] },
                "metadata": { "queryTime": 0, "provider": "in-memory" }
            })),
            METADATA_PATH => Some(json!({
                "provider": "in-memory",
                "version": env!("CARGO_PKG_VERSION"),
                "capabilities": ["query", "list"]
            })),
            HEALTH_PATH => Some(json!({
                "status": "ok",
                "services": { "database": { "connected": true, "latency": 0 } }
            })),
            _ => None,
        }
    }
}

#[async_trait]
impl GraphBackend for InMemoryBackend {
    async fn call(&self, request: BackendRequest) -> Result<Value, BackendError> {
        let path = request.path.clone();
        if let Ok(mut calls) = self.calls.write() {
            calls.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.get(&path) {
            return Err(error.clone());
        }

        self.responses
            .get(&path)
            .cloned()
            .or_else(|| self.default_response(&path))
            .ok_or_else(|| BackendError::Status {
                status: 404,
                body: format!("no route for {}", path),
            })
    }
}
