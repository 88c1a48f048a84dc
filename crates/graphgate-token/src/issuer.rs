//! Token minting.

use crate::claims::{TenantClaims, TrustedClaims};
use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use crate::keys::KeyMaterial;
use graphgate_core::AuthConfig;
use graphgate_core::isolation::is_valid_tenant_id;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::sync::Arc;

/// Default lifetime of a tenant token.
pub const DEFAULT_TENANT_TTL_SECS: u64 = 3600;

/// Subject of the development bearer token printed at startup.
pub const DEVELOPMENT_SUBJECT: &str = "dev-user";

/// Mints trusted and tenant tokens from one [`KeyMaterial`].
#[derive(Clone)]
pub struct TokenIssuer {
    trusted_key: EncodingKey,
    tenant_key: EncodingKey,
    key_id: String,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer for the given key material.
    pub fn new(keys: &KeyMaterial) -> Result<Self, AuthError> {
        let trusted_key = EncodingKey::from_ed_der(&keys.signing_key_der()?);
        let tenant_key = EncodingKey::from_secret(keys.tenant_secret());

        Ok(Self {
            trusted_key,
            tenant_key,
            key_id: keys.key_id(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use a different time source for `iat`/`exp`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mint a trusted token, carried as `Authorization: Bearer`.
    pub fn issue_trusted(
        &self,
        subject: &str,
        issuer: &str,
        audience: &str,
        scopes: &[String],
        ttl_seconds: u64,
    ) -> Result<String, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::InvalidInput("subject must not be empty".into()));
        }

        let iat = self.clock.now();
        let claims = TrustedClaims {
            sub: subject.to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            scope: scopes.join(" "),
            iat,
            exp: expires_at(iat, ttl_seconds)?,
        };

        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(self.key_id.clone());

        let token = encode(&header, &claims, &self.trusted_key)
            .map_err(|e| AuthError::KeyEncoding(e.to_string()))?;

        tracing::debug!(subject = %subject, exp = claims.exp, "Issued trusted token");
        Ok(token)
    }

    /// Mint a tenant token, carried as `?token=`.
    pub fn issue_tenant(
        &self,
        tenant_id: &str,
        user_id: &str,
        ttl_seconds: u64,
    ) -> Result<String, AuthError> {
        if tenant_id.is_empty() || user_id.is_empty() {
            return Err(AuthError::InvalidInput(
                "tenant and user must not be empty".into(),
            ));
        }
        if !is_valid_tenant_id(tenant_id) {
            return Err(AuthError::InvalidInput(format!(
                "tenant '{}' must not contain '_'",
                tenant_id
            )));
        }

        let iat = self.clock.now();
        let claims = TenantClaims {
            tenant: tenant_id.to_string(),
            user: user_id.to_string(),
            iat,
            exp: expires_at(iat, ttl_seconds)?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.tenant_key)
            .map_err(|e| AuthError::KeyEncoding(e.to_string()))?;

        tracing::debug!(tenant = %tenant_id, user = %user_id, exp = claims.exp, "Issued tenant token");
        Ok(token)
    }

    /// Mint the bearer token printed at startup for local development.
    pub fn issue_development_token(&self, config: &AuthConfig) -> Result<String, AuthError> {
        let scopes = ["read".to_string(), "write".to_string()];
        self.issue_trusted(
            DEVELOPMENT_SUBJECT,
            &config.issuer,
            &config.audience,
            &scopes,
            config.trusted_token_ttl_secs,
        )
    }
}

fn expires_at(iat: i64, ttl_seconds: u64) -> Result<i64, AuthError> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(|ttl| iat.checked_add(ttl))
        .ok_or_else(|| AuthError::InvalidInput(format!("ttl {}s is out of range", ttl_seconds)))
}
