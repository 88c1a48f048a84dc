//! Token verification.
//!
//! The verifier never inspects a token to guess its kind. The caller says
//! where the credential arrived through [`Credential`], and each kind is
//! checked with exactly one algorithm:
//!
//! - `Authorization: Bearer` → EdDSA, issuer and audience must match
//! - `?token=` → HS256, `tenant` and `user` claims required
//!
//! Expiry is checked against an injectable [`Clock`] with a bounded leeway.

use crate::claims::{RawTenantClaims, RawTrustedClaims, parse_scopes};
use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use crate::keys::KeyMaterial;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use graphgate_core::AuthContext;
use graphgate_core::isolation::is_valid_tenant_id;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use std::sync::Arc;

/// Default clock-skew allowance on expiry.
pub const DEFAULT_LEEWAY_SECS: u64 = 5;

pub use graphgate_core::config::MAX_LEEWAY_SECS;

/// A credential together with the slot it was presented in.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`, verified as a trusted token.
    HeaderBearer(String),
    /// `?token=<token>`, verified as a tenant token.
    QueryToken(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeaderBearer(_) => f.write_str("HeaderBearer(<redacted>)"),
            Self::QueryToken(_) => f.write_str("QueryToken(<redacted>)"),
        }
    }
}

/// Verifies trusted and tenant tokens minted from one [`KeyMaterial`].
#[derive(Clone)]
pub struct TokenVerifier {
    trusted_key: DecodingKey,
    tenant_key: DecodingKey,
    issuer: String,
    audience: String,
    leeway_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a verifier expecting the given bearer-token issuer and audience.
    pub fn new(
        keys: &KeyMaterial,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let trusted_key = DecodingKey::from_ed_components(&keys.public_key_x())
            .map_err(|e| AuthError::KeyEncoding(e.to_string()))?;
        let tenant_key = DecodingKey::from_secret(keys.tenant_secret());

        Ok(Self {
            trusted_key,
            tenant_key,
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
            clock: Arc::new(SystemClock),
        })
    }

    /// Set the clock-skew allowance, capped at [`MAX_LEEWAY_SECS`].
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        if leeway_secs > MAX_LEEWAY_SECS {
            tracing::warn!(
                requested = leeway_secs,
                max = MAX_LEEWAY_SECS,
                "Leeway too large, capping"
            );
        }
        self.leeway_secs = leeway_secs.min(MAX_LEEWAY_SECS);
        self
    }

    /// Use a different time source for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }

    /// Verify a credential according to the slot it arrived in.
    pub fn verify(&self, credential: &Credential) -> Result<AuthContext, AuthError> {
        match credential {
            Credential::HeaderBearer(token) => self.verify_trusted(token),
            Credential::QueryToken(token) => self.verify_tenant(token),
        }
    }

    /// Verify a trusted (EdDSA) token.
    pub fn verify_trusted(&self, token: &str) -> Result<AuthContext, AuthError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        let claims = decode::<RawTrustedClaims>(token, &self.trusted_key, &validation)
            .map_err(|e| classify(token, e))?
            .claims;

        self.check_expiry(claims.exp)?;

        let subject = non_empty(claims.sub)?;
        let scopes = parse_scopes(claims.scope.as_deref().unwrap_or_default());
        Ok(AuthContext::trusted(subject, scopes))
    }

    /// Verify a tenant (HS256) token.
    pub fn verify_tenant(&self, token: &str) -> Result<AuthContext, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<RawTenantClaims>(token, &self.tenant_key, &validation)
            .map_err(|e| classify(token, e))?
            .claims;

        self.check_expiry(claims.exp)?;

        let tenant = non_empty(claims.tenant)?;
        let user = non_empty(claims.user)?;
        if !is_valid_tenant_id(&tenant) {
            return Err(AuthError::ClaimMismatch);
        }
        Ok(AuthContext::tenant(tenant, user))
    }

    /// Accept while `now <= exp + leeway`.
    fn check_expiry(&self, exp: Option<i64>) -> Result<(), AuthError> {
        let exp = exp.ok_or(AuthError::ClaimMismatch)?;
        let leeway = i64::try_from(self.leeway_secs).unwrap_or(0);
        if self.clock.now() > exp.saturating_add(leeway) {
            return Err(AuthError::Expired);
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::ClaimMismatch)
}

/// Map a `jsonwebtoken` failure onto an [`AuthError`].
fn classify(token: &str, err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimMismatch,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        // A readable token whose signature segment will not decode has been
        // tampered with rather than mangled in transit.
        ErrorKind::Base64(_) if has_readable_header_and_payload(token) => {
            AuthError::InvalidSignature
        }
        _ => AuthError::MalformedToken,
    }
}

fn has_readable_header_and_payload(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || decode_header(token).is_err() {
        return false;
    }
    URL_SAFE_NO_PAD
        .decode(parts[1])
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .is_some()
}
