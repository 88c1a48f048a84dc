//! Public discovery documents.
//!
//! Serves `GET /.well-known/oauth-authorization-server` (RFC 8414) and
//! `GET /.well-known/jwks.json`. The proxy only verifies self-contained
//! tokens; these documents let clients find the issuer and public key.

use graphgate_token::{JwkSet, KeyMaterial};
use serde_json::{Value, json};

/// Scopes carried by trusted tokens.
pub const SCOPES_SUPPORTED: &[&str] = &["read", "write"];

/// Data behind the discovery endpoints.
#[derive(Debug, Clone)]
pub struct Discovery {
    issuer: String,
    base_url: String,
    jwks: JwkSet,
}

impl Discovery {
    /// `base_url` is where clients reach this proxy.
    pub fn new(keys: &KeyMaterial, issuer: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            issuer: issuer.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            jwks: keys.jwks(),
        }
    }

    /// RFC 8414 authorization server metadata.
    pub fn metadata(&self) -> Value {
        json!({
            "issuer": self.issuer,
            "authorization_endpoint": format!("{}/authorize", self.base_url),
            "token_endpoint": format!("{}/token", self.base_url),
            "jwks_uri": format!("{}/.well-known/jwks.json", self.base_url),
            "response_types_supported": ["code"],
            "grant_types_supported": ["authorization_code", "client_credentials"],
            "token_endpoint_auth_methods_supported": ["none"],
            "scopes_supported": SCOPES_SUPPORTED,
        })
    }

    pub fn jwks(&self) -> &JwkSet {
        &self.jwks
    }
}
