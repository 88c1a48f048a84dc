//! Error types for token operations.

use thiserror::Error;

/// Errors that can occur while issuing or verifying tokens.
///
/// Verification failures carry no token material. The HTTP layer maps every
/// verification failure to the same 401 response and only logs
/// [`AuthError::class`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential in the slot the listener accepts.
    #[error("missing credential")]
    MissingCredential,

    /// Token is not a well-formed JWS, or the credential is ambiguous.
    #[error("malformed token")]
    MalformedToken,

    /// Signature does not verify, or the algorithm does not match the slot.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token expired beyond the allowed clock skew.
    #[error("token has expired")]
    Expired,

    /// Issuer, audience or a required claim is wrong or missing.
    #[error("token claims do not match")]
    ClaimMismatch,

    /// Caller supplied an unusable value when issuing a token.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Key material could not be encoded for signing. Fatal at startup.
    #[error("key encoding failed: {0}")]
    KeyEncoding(String),
}

impl AuthError {
    /// Short, stable name of the failure, safe for logs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedToken => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::ClaimMismatch => "claim_mismatch",
            Self::InvalidInput(_) => "invalid_input",
            Self::KeyEncoding(_) => "key_encoding",
        }
    }
}
