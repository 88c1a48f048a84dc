//! HTTP implementation of [`GraphBackend`].

use crate::error::BackendError;
use crate::request::{BackendRequest, Method};
use crate::GraphBackend;
use async_trait::async_trait;
use graphgate_core::BackendConfig;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the backend API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the tenant of a tenant-context call.
pub const TENANT_HEADER: &str = "x-tenant-id";
/// Header carrying the user of a tenant-context call.
pub const USER_HEADER: &str = "x-user-id";

/// Longest error body kept from a failed backend call, in characters.
const MAX_ERROR_BODY: usize = 512;

/// Talks to the graph query backend over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Build a client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Unavailable(format!("timed out after {}s", self.timeout.as_secs()))
        } else if err.is_builder() {
            BackendError::Config(err.to_string())
        } else {
            BackendError::Unavailable(err.to_string())
        }
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl GraphBackend for HttpBackend {
    async fn call(&self, request: BackendRequest) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        builder = builder.header(API_KEY_HEADER, &self.api_key);
        if let Some(identity) = &request.identity {
            builder = builder
                .header(TENANT_HEADER, &identity.tenant)
                .header(USER_HEADER, &identity.user);
        }
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        tracing::debug!(
            method = ?request.method,
            path = %request.path,
            tenant = request.identity.as_ref().map(|i| i.tenant.as_str()).unwrap_or("-"),
            "Calling backend"
        );

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path = %request.path, "Backend returned error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: error_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// Trimmed and truncated body of a failed call.
fn error_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}…", &body[..end]),
        None => body.to_string(),
    }
}
