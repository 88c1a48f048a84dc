//! Authentication context attached to every verified request.

use serde::Serialize;
use std::fmt;

/// Which credential scheme produced an [`AuthContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Bearer token from the `Authorization` header. Unrestricted access.
    Trusted,
    /// Per-tenant URL token. Access confined to one tenant's namespace.
    Tenant,
}

/// Identity derived from a verified credential.
///
/// The tenant identifier exists only on the `Tenant` variant, so a trusted
/// context can never carry a tenant and a tenant context can never lack one.
/// A context is built by the token verifier for a single request and is
/// never cached or shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Trusted {
        /// Subject claim of the bearer token.
        user: String,
        /// Scopes granted to the bearer token.
        scopes: Vec<String>,
    },
    Tenant {
        tenant: String,
        user: String,
    },
}

impl AuthContext {
    /// Build a trusted context.
    pub fn trusted(user: impl Into<String>, scopes: Vec<String>) -> Self {
        Self::Trusted {
            user: user.into(),
            scopes,
        }
    }

    /// Build a tenant context.
    pub fn tenant(tenant: impl Into<String>, user: impl Into<String>) -> Self {
        Self::Tenant {
            tenant: tenant.into(),
            user: user.into(),
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            Self::Trusted { .. } => AuthKind::Trusted,
            Self::Tenant { .. } => AuthKind::Tenant,
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted { .. })
    }

    pub fn is_tenant(&self) -> bool {
        matches!(self, Self::Tenant { .. })
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::Trusted { user, .. } | Self::Tenant { user, .. } => user,
        }
    }

    /// Tenant identifier, present only for tenant contexts.
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            Self::Trusted { .. } => None,
            Self::Tenant { tenant, .. } => Some(tenant),
        }
    }

    /// Scopes of a trusted context. Tenant contexts have none.
    pub fn scopes(&self) -> &[String] {
        match self {
            Self::Trusted { scopes, .. } => scopes,
            Self::Tenant { .. } => &[],
        }
    }
}

impl fmt::Display for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trusted { user, .. } => write!(f, "trusted user: {}", user),
            Self::Tenant { tenant, user } => write!(f, "tenant: {}, user: {}", tenant, user),
        }
    }
}
