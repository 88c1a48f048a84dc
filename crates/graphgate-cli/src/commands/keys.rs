//! Key management commands.
//!
//! `graphgate keys generate` - Generate a tenant token secret.
//!
//! The Ed25519 signing key is never written out: each process generates its
//! own at startup. Only the tenant secret has to be shared.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use graphgate_token::keys::TENANT_SECRET_LEN;
use rand::RngCore;

/// Random tenant secret, base64url encoded.
pub fn new_tenant_secret() -> String {
    let mut secret = [0u8; TENANT_SECRET_LEN];
    rand::rng().fill_bytes(&mut secret);
    URL_SAFE_NO_PAD.encode(secret)
}

/// Generate and print a tenant secret.
pub fn generate() -> anyhow::Result<()> {
    let secret = new_tenant_secret();

    println!("✔ Generated tenant secret:");
    println!("{}", secret);
    println!();
    println!("⚠️  Keep this secret! Anyone holding it can mint tenant tokens.");
    println!();
    println!("Set it on every proxy instance serving the same tenants:");
    println!("  export GRAPHGATE_TENANT_SECRET={}", secret);

    Ok(())
}
