//! Token claim sets.

use serde::{Deserialize, Serialize};

/// Claims of a trusted (bearer) token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedClaims {
    /// Subject, the user the token was issued to.
    pub sub: String,
    pub iss: String,
    pub aud: String,
    /// Space-separated scopes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

impl TrustedClaims {
    /// Scopes as a list.
    pub fn scopes(&self) -> Vec<String> {
        parse_scopes(&self.scope)
    }
}

/// Claims of a tenant (URL) token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantClaims {
    pub tenant: String,
    pub user: String,
    pub iat: i64,
    pub exp: i64,
}

/// Split a space-separated scope string.
pub fn parse_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Trusted claims as found on the wire, before required fields are checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrustedClaims {
    pub sub: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub exp: Option<i64>,
}

/// Tenant claims as found on the wire, before required fields are checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTenantClaims {
    pub tenant: Option<String>,
    pub user: Option<String>,
    pub exp: Option<i64>,
}
