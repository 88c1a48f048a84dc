//! Key material for signing and verifying tokens.

use crate::error::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a generated tenant secret in bytes.
pub const TENANT_SECRET_LEN: usize = 32;

/// Signing keypair for trusted tokens plus the shared secret for tenant
/// tokens.
///
/// Generated once per process and kept in memory. Only the public half of
/// the keypair is reachable through this type's public methods.
#[derive(Clone)]
pub struct KeyMaterial {
    signing_key: SigningKey,
    tenant_secret: Vec<u8>,
}

impl KeyMaterial {
    /// Generate a fresh keypair and a fresh tenant secret.
    pub fn generate() -> Self {
        let mut rng = rand::rng();

        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let signing_key = SigningKey::from_bytes(&seed);

        let mut tenant_secret = vec![0u8; TENANT_SECRET_LEN];
        rng.fill_bytes(&mut tenant_secret);

        Self {
            signing_key,
            tenant_secret,
        }
    }

    /// Replace the generated tenant secret with a configured one.
    ///
    /// Proxy instances serving the same tenants must share this secret.
    pub fn with_tenant_secret(mut self, secret: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::InvalidInput(
                "tenant secret must not be empty".into(),
            ));
        }
        self.tenant_secret = secret;
        Ok(self)
    }

    /// Raw Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }

    /// Stable identifier of the public key, used as the JWT `kid`.
    pub fn key_id(&self) -> String {
        let digest = Sha256::digest(self.public_key_bytes());
        let mut kid = URL_SAFE_NO_PAD.encode(digest);
        kid.truncate(16);
        kid
    }

    /// Public key as a JSON Web Key.
    pub fn jwk(&self) -> Jwk {
        Jwk {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: self.public_key_x(),
            kid: self.key_id(),
            alg: "EdDSA".to_string(),
            key_use: "sig".to_string(),
        }
    }

    /// Public key set containing [`Self::jwk`].
    pub fn jwks(&self) -> JwkSet {
        JwkSet {
            keys: vec![self.jwk()],
        }
    }

    /// Base64url-encoded public key, the JWK `x` member.
    pub(crate) fn public_key_x(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.public_key_bytes())
    }

    /// PKCS#8 DER encoding of the private key, as `jsonwebtoken` expects.
    pub(crate) fn signing_key_der(&self) -> Result<Vec<u8>, AuthError> {
        let document = self
            .signing_key
            .to_pkcs8_der()
            .map_err(|e| AuthError::KeyEncoding(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    pub(crate) fn tenant_secret(&self) -> &[u8] {
        &self.tenant_secret
    }

    fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id())
            .field("signing_key", &"<redacted>")
            .field("tenant_secret", &"<redacted>")
            .finish()
    }
}

/// A JSON Web Key for an Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub key_use: String,
}

/// A JSON Web Key Set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}
