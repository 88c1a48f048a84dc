//! Serve command for starting the graphgate proxy.
//!
//! `graphgate serve` - Start the MCP proxy in front of the graph backend.
//!
//! With only `server.bind` configured a single listener accepts both
//! credential kinds. With `server.tenant_bind` as well, bearer tokens are
//! accepted only on `bind` and URL tokens only on `tenant_bind`.

use anyhow::{Context, bail};
use clap::Args;
use graphgate_backend::HttpBackend;
use graphgate_core::GraphGateConfig;
use graphgate_mcp::discovery::Discovery;
use graphgate_mcp::{AppState, HttpServer, McpServer, SlotPolicy, ToolRouter};
use graphgate_token::{TokenIssuer, TokenVerifier};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Tenant tokens printed at startup when none are requested.
const SAMPLE_TENANTS: &[&str] = &["acme:admin", "widgets:user1"];

/// Arguments of `graphgate serve`. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Main listener address.
    #[arg(long, env = "GRAPHGATE_BIND")]
    pub bind: Option<String>,

    /// Separate listener for tenant URL tokens.
    #[arg(long, env = "GRAPHGATE_TENANT_BIND")]
    pub tenant_bind: Option<String>,

    /// Externally reachable base URL.
    #[arg(long, env = "GRAPHGATE_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Graph backend base URL.
    #[arg(long, env = "GRAPHGATE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// API key sent to the backend.
    #[arg(long, env = "GRAPHGATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print a tenant token for `tenant:user` at startup. Repeatable.
    #[arg(long = "tenant-token")]
    pub tenant_tokens: Vec<String>,
}

impl ServeArgs {
    /// Apply command-line overrides to the loaded configuration.
    pub fn apply(&self, config: &mut GraphGateConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(tenant_bind) = &self.tenant_bind {
            config.server.tenant_bind = Some(tenant_bind.clone());
        }
        if let Some(public_url) = &self.public_url {
            config.server.public_url = Some(public_url.clone());
        }
        if let Some(url) = &self.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.backend.api_key = api_key.clone();
            config.backend.api_key_env = None;
        }
    }

    /// `(tenant, user)` pairs to print tokens for.
    fn sample_tenants(&self) -> anyhow::Result<Vec<(String, String)>> {
        let specs: Vec<&str> = if self.tenant_tokens.is_empty() {
            SAMPLE_TENANTS.to_vec()
        } else {
            self.tenant_tokens.iter().map(String::as_str).collect()
        };
        specs.into_iter().map(parse_tenant_spec).collect()
    }
}

/// Parse `tenant:user`.
fn parse_tenant_spec(spec: &str) -> anyhow::Result<(String, String)> {
    match spec.split_once(':') {
        Some((tenant, user)) if !tenant.is_empty() && !user.is_empty() => {
            Ok((tenant.to_string(), user.to_string()))
        }
        _ => bail!("Invalid --tenant-token '{}', expected tenant:user", spec),
    }
}

/// Start the proxy and run until Ctrl-C.
pub async fn run(config_path: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    let samples = args.sample_tenants()?;

    let keys = super::key_material(&config.auth)?;
    let issuer = TokenIssuer::new(&keys).context("Failed to initialize token issuer")?;
    let verifier = TokenVerifier::new(&keys, &config.auth.issuer, &config.auth.audience)
        .context("Failed to initialize token verifier")?
        .with_leeway(config.auth.effective_leeway_secs());

    let backend = HttpBackend::new(&config.backend).context("Failed to create backend client")?;
    let router = ToolRouter::new(Arc::new(backend)).with_timeout(config.backend.timeout());
    let discovery = Discovery::new(&keys, &config.auth.issuer, config.server.public_base_url());
    let state = Arc::new(AppState::new(
        McpServer::new(router),
        Arc::new(verifier),
        discovery,
    ));

    tracing::info!(
        bind = %config.server.bind,
        tenant_bind = config.server.tenant_bind.as_deref().unwrap_or("-"),
        backend = %config.backend.url,
        key_id = %keys.key_id(),
        "Starting graphgate"
    );
    print_banner(&config, &issuer, &samples)?;

    let shutdown = shutdown_channel();

    match &config.server.tenant_bind {
        None => {
            HttpServer::new(state, SlotPolicy::Either)
                .run(&config.server.bind, wait_for_shutdown(shutdown))
                .await?;
        }
        Some(tenant_bind) => {
            let trusted = HttpServer::new(state.clone(), SlotPolicy::HeaderOnly);
            let tenant = HttpServer::new(state, SlotPolicy::QueryOnly);
            tokio::try_join!(
                trusted.run(&config.server.bind, wait_for_shutdown(shutdown.clone())),
                tenant.run(tenant_bind, wait_for_shutdown(shutdown)),
            )?;
        }
    }

    tracing::info!("graphgate stopped");
    Ok(())
}

/// Receiver that flips to `true` on Ctrl-C.
fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                let _ = tx.send(true);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                // Dropping the sender would stop the listeners.
                let _tx = tx;
                std::future::pending::<()>().await
            }
        }
    });
    rx
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

fn print_banner(
    config: &GraphGateConfig,
    issuer: &TokenIssuer,
    samples: &[(String, String)],
) -> anyhow::Result<()> {
    let base_url = config.server.public_base_url();
    let tenant_url = config.server.tenant_base_url();

    println!("🚀 graphgate");
    println!("📡 Backend URL: {}", config.backend.url);
    if config.server.has_split_listeners() {
        println!("🔐 Bearer listener: {}", base_url);
        println!("🌐 Tenant listener: {}", tenant_url);
    } else {
        println!("🔐 Listening on: {}", base_url);
    }

    let dev_token = issuer
        .issue_development_token(&config.auth)
        .context("Failed to mint development token")?;
    println!();
    println!("🔑 Development bearer token:");
    println!("Bearer {}", dev_token);

    println!();
    println!("🏢 Tenant URLs:");
    for (tenant, user) in samples {
        let token = issuer
            .issue_tenant(tenant, user, config.auth.tenant_token_ttl_secs)
            .with_context(|| format!("Failed to mint token for tenant '{}'", tenant))?;
        println!("  {} ({}): {}/sse?token={}", tenant, user, tenant_url, token);
    }

    println!();
    println!("📍 OAuth Authorization Server Metadata:");
    println!("   {}/.well-known/oauth-authorization-server", base_url);
    println!();

    Ok(())
}
