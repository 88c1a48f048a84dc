//! Graph query backend configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for a single backend call.
pub const MAX_TIMEOUT_SECS: u64 = 30;

/// Configuration for the graph query backend.
///
/// The API key is resolved in order of precedence:
/// 1. Environment variable named by `api_key_env`
/// 2. `api_key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:3000`.
    #[serde(default = "default_url")]
    pub url: String,

    /// API key sent as `x-api-key` on every call.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Environment variable containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Timeout per backend call in seconds, clamped to 1..=30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: default_api_key(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Resolve the API key from environment or config.
    pub fn resolve_api_key(&self) -> String {
        if let Some(env_var) = &self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return key;
            }
        }
        self.api_key.clone()
    }

    /// Effective timeout for one backend call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
    }
}

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_key() -> String {
    "dev-api-key".to_string()
}

fn default_timeout_secs() -> u64 {
    MAX_TIMEOUT_SECS
}
