use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(
    name = "graphgate",
    version,
    about = "Multi-tenant authenticating proxy for graph query backends"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "graphgate.yaml", env = "GRAPHGATE_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the proxy.
    Serve(ServeArgs),

    /// Key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Token minting and verification
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a tenant token secret to share between proxy instances.
    Generate,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a tenant token for use as `?token=`.
    MintTenant {
        #[arg(long)]
        tenant: String,

        #[arg(long)]
        user: String,

        /// Lifetime in seconds. Defaults to auth.tenant_token_ttl_secs.
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Mint a bearer token signed with a fresh key.
    MintTrusted {
        #[arg(long, default_value = "dev-user")]
        subject: String,

        /// Granted scope. Repeat for several.
        #[arg(long = "scope", default_values_t = ["read".to_string(), "write".to_string()])]
        scopes: Vec<String>,

        /// Lifetime in seconds. Defaults to auth.trusted_token_ttl_secs.
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Verify a tenant token against the configured secret.
    Verify {
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve(args) => commands::serve::run(&cli.config, args).await?,

        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate => commands::keys::generate()?,
        },

        Command::Token { cmd } => {
            let config = commands::load_config(&cli.config)?;
            match cmd {
                TokenCommand::MintTenant { tenant, user, ttl } => {
                    commands::token::mint_tenant(&config, &tenant, &user, ttl)?
                }
                TokenCommand::MintTrusted {
                    subject,
                    scopes,
                    ttl,
                } => commands::token::mint_trusted(&config, &subject, &scopes, ttl)?,
                TokenCommand::Verify { token } => commands::token::verify(&config, &token)?,
            }
        }
    }

    Ok(())
}
