//! Token configuration.

use serde::{Deserialize, Serialize};

/// Largest accepted clock-skew allowance.
pub const MAX_LEEWAY_SECS: u64 = 60;

/// Configuration for issuing and verifying tokens.
///
/// The tenant secret is resolved in order of precedence:
/// 1. Environment variable named by `tenant_secret_env`
/// 2. `tenant_secret`
/// 3. Random secret generated at startup (tokens do not survive a restart)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected `iss` claim of bearer tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Expected `aud` claim of bearer tokens.
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Shared secret for tenant tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_secret: Option<String>,

    /// Environment variable containing the tenant secret.
    #[serde(default = "default_tenant_secret_env")]
    pub tenant_secret_env: String,

    /// Clock-skew allowance for expiry checks, capped at 60 seconds.
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,

    /// Lifetime of tenant tokens minted by the CLI.
    #[serde(default = "default_ttl_secs")]
    pub tenant_token_ttl_secs: u64,

    /// Lifetime of the development bearer token.
    #[serde(default = "default_ttl_secs")]
    pub trusted_token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            audience: default_audience(),
            tenant_secret: None,
            tenant_secret_env: default_tenant_secret_env(),
            leeway_secs: default_leeway_secs(),
            tenant_token_ttl_secs: default_ttl_secs(),
            trusted_token_ttl_secs: default_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Resolve the tenant secret from environment or config.
    pub fn resolve_tenant_secret(&self) -> Option<String> {
        if let Ok(secret) = std::env::var(&self.tenant_secret_env) {
            if !secret.is_empty() {
                return Some(secret);
            }
        }
        self.tenant_secret.clone().filter(|s| !s.is_empty())
    }

    pub fn effective_leeway_secs(&self) -> u64 {
        self.leeway_secs.min(MAX_LEEWAY_SECS)
    }
}

fn default_issuer() -> String {
    "https://graphgate.local".to_string()
}

fn default_audience() -> String {
    "graphgate-mcp".to_string()
}

fn default_tenant_secret_env() -> String {
    "GRAPHGATE_TENANT_SECRET".to_string()
}

fn default_leeway_secs() -> u64 {
    5
}

fn default_ttl_secs() -> u64 {
    3600
}
