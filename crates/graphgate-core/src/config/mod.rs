//! Configuration types for graphgate.
//!
//! Configuration is read from a single YAML file (`graphgate.yaml` by
//! default). Every section is optional; missing values fall back to
//! development defaults. The CLI layers flag and environment overrides on
//! top of the loaded file.
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:3001
//!   tenant_bind: 0.0.0.0:3003
//! backend:
//!   url: http://localhost:3000
//!   api_key_env: GRAPHGATE_BACKEND_API_KEY
//! auth:
//!   issuer: https://graphgate.local
//!   audience: graphgate-mcp
//!   tenant_secret_env: GRAPHGATE_TENANT_SECRET
//! ```

pub mod auth;
pub mod backend;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use auth::{AuthConfig, MAX_LEEWAY_SECS};
pub use backend::BackendConfig;
pub use server::ServerConfig;

/// Complete graphgate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphGateConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Graph query backend.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Token issuing and verification.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraphGateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(config = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.issuer.trim().is_empty() {
            return Err(ConfigError::Config("auth.issuer must not be empty".into()));
        }
        if self.auth.audience.trim().is_empty() {
            return Err(ConfigError::Config("auth.audience must not be empty".into()));
        }
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Config("backend.url must not be empty".into()));
        }
        if let Some(tenant_bind) = &self.server.tenant_bind {
            if tenant_bind == &self.server.bind {
                return Err(ConfigError::Config(
                    "server.tenant_bind must differ from server.bind".into(),
                ));
            }
        }
        Ok(())
    }
}
