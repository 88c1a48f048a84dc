//! CLI command implementations for the graphgate proxy.

pub mod keys;
pub mod serve;
pub mod token;

use anyhow::Context;
use graphgate_core::{AuthConfig, GraphGateConfig};
use graphgate_token::KeyMaterial;
use std::path::Path;

/// Load the configuration file, falling back to defaults when it is absent.
pub fn load_config(path: &Path) -> anyhow::Result<GraphGateConfig> {
    GraphGateConfig::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Fresh signing key plus the configured tenant secret, if any.
///
/// Without a configured secret the generated one is kept, so tenant tokens
/// are only valid for this process.
pub fn key_material(auth: &AuthConfig) -> anyhow::Result<KeyMaterial> {
    let keys = KeyMaterial::generate();
    match auth.resolve_tenant_secret() {
        Some(secret) => keys
            .with_tenant_secret(secret.into_bytes())
            .context("Invalid tenant secret"),
        None => {
            tracing::warn!(
                env = %auth.tenant_secret_env,
                "No tenant secret configured, generated one for this process"
            );
            Ok(keys)
        }
    }
}
