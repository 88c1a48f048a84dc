//! Token management commands.
//!
//! `graphgate token mint-tenant` - Mint a tenant token for `?token=`.
//! `graphgate token mint-trusted` - Mint a bearer token with a fresh key.
//! `graphgate token verify` - Verify a tenant token.

use anyhow::{Context, bail};
use graphgate_core::{AuthContext, GraphGateConfig};
use graphgate_token::{Credential, KeyMaterial, TokenIssuer, TokenVerifier};

/// Keys holding the configured tenant secret. Fails when none is configured.
fn shared_key_material(config: &GraphGateConfig) -> anyhow::Result<KeyMaterial> {
    let secret = config.auth.resolve_tenant_secret().with_context(|| {
        format!(
            "No tenant secret configured. Set {} or auth.tenant_secret",
            config.auth.tenant_secret_env
        )
    })?;
    KeyMaterial::generate()
        .with_tenant_secret(secret.into_bytes())
        .context("Invalid tenant secret")
}

fn expiry_text(ttl_secs: u64) -> String {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string())
}

/// Mint a tenant token with the shared secret.
pub fn mint_tenant_token(
    config: &GraphGateConfig,
    tenant: &str,
    user: &str,
    ttl: Option<u64>,
) -> anyhow::Result<String> {
    let keys = shared_key_material(config)?;
    let issuer = TokenIssuer::new(&keys)?;
    let ttl = ttl.unwrap_or(config.auth.tenant_token_ttl_secs);

    issuer
        .issue_tenant(tenant, user, ttl)
        .with_context(|| format!("Failed to mint token for tenant '{}'", tenant))
}

/// Check a tenant token against the shared secret.
pub fn verify_tenant_token(config: &GraphGateConfig, token: &str) -> anyhow::Result<AuthContext> {
    let keys = shared_key_material(config)?;
    let verifier = TokenVerifier::new(&keys, &config.auth.issuer, &config.auth.audience)?
        .with_leeway(config.auth.effective_leeway_secs());

    match verifier.verify(&Credential::QueryToken(token.trim().to_string())) {
        Ok(ctx) => Ok(ctx),
        Err(e) => bail!("Token verification failed: {}", e),
    }
}

pub fn mint_tenant(
    config: &GraphGateConfig,
    tenant: &str,
    user: &str,
    ttl: Option<u64>,
) -> anyhow::Result<()> {
    let token = mint_tenant_token(config, tenant, user, ttl)?;
    let ttl = ttl.unwrap_or(config.auth.tenant_token_ttl_secs);

    println!("✔ Minted tenant token:");
    println!("  Tenant:  {}", tenant);
    println!("  User:    {}", user);
    println!("  Expires: {}", expiry_text(ttl));
    println!();
    println!("{}", token);
    println!();
    println!("SSE URL:");
    println!("  {}/sse?token={}", config.server.tenant_base_url(), token);

    Ok(())
}

pub fn mint_trusted(
    config: &GraphGateConfig,
    subject: &str,
    scopes: &[String],
    ttl: Option<u64>,
) -> anyhow::Result<()> {
    let keys = KeyMaterial::generate();
    let issuer = TokenIssuer::new(&keys)?;
    let ttl = ttl.unwrap_or(config.auth.trusted_token_ttl_secs);

    let token = issuer
        .issue_trusted(subject, &config.auth.issuer, &config.auth.audience, scopes, ttl)
        .context("Failed to mint bearer token")?;

    println!("✔ Minted bearer token:");
    println!("  Subject: {}", subject);
    println!("  Scopes:  {}", scopes.join(" "));
    println!("  Expires: {}", expiry_text(ttl));
    println!();
    println!("Bearer {}", token);
    println!();
    println!("⚠️  Signed with a fresh key (kid {}).", keys.key_id());
    println!("   Only verifiers holding this public key accept it:");
    println!("{}", serde_json::to_string_pretty(&keys.jwks())?);

    Ok(())
}

pub fn verify(config: &GraphGateConfig, token: &str) -> anyhow::Result<()> {
    let ctx = verify_tenant_token(config, token)?;

    println!("✔ Token is valid");
    println!("  Tenant: {}", ctx.tenant_id().unwrap_or("-"));
    println!("  User:   {}", ctx.user_id());

    Ok(())
}
