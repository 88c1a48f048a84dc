//! # graphgate-token
//!
//! Token handling for graphgate.
//!
//! This crate provides functionality for:
//! - Generating the process signing keypair and the tenant secret
//! - Minting trusted (bearer) and tenant (URL) tokens
//! - Verifying either kind into an [`AuthContext`](graphgate_core::AuthContext)
//!
//! ## Two Token Kinds
//!
//! | Token Kind | Carried In | Algorithm | Access |
//! |------------|------------|-----------|--------|
//! | **Trusted** | `Authorization: Bearer` | EdDSA (Ed25519) | Every graph |
//! | **Tenant** | `?token=` query parameter | HS256 | The tenant's own graphs |
//!
//! Each kind is only ever checked with its own algorithm, so a token
//! presented in the wrong place fails signature verification.

pub mod claims;
pub mod clock;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod verifier;

pub use claims::{TenantClaims, TrustedClaims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AuthError;
pub use issuer::TokenIssuer;
pub use keys::{Jwk, JwkSet, KeyMaterial};
pub use verifier::{Credential, DEFAULT_LEEWAY_SECS, MAX_LEEWAY_SECS, TokenVerifier};
