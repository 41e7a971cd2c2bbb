use std::fs;
use std::sync::Arc;

use chrono::Duration;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use docvault::auth::{PasswordContext, TokenService, TokenSigner};
use docvault::config::ServerConfig;
use docvault::server::{AppState, create_router};
use docvault::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "docvault")]
#[command(about = "A multi-tenant document store server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Path to a TOML config file; flags below override its values
        #[arg(long)]
        config: Option<String>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<String>,

        /// Symmetric token-signing secret. Falls back to the
        /// DOCVAULT_SECRET_KEY environment variable, then to an ephemeral
        /// generated secret.
        #[arg(long)]
        secret_key: Option<String>,
    },
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let secret = match &config.secret_key {
        Some(secret) => secret.clone(),
        None => {
            warn!("No secret key configured; tokens will not survive a restart");
            generate_secret()
        }
    };

    let signer = TokenSigner::new(&secret, &config.algorithm)?;
    let tokens = TokenService::new(
        signer,
        Duration::minutes(config.access_token_ttl_minutes),
        Duration::minutes(config.refresh_token_ttl_minutes),
    );

    let state = Arc::new(AppState::new(
        Arc::new(store),
        tokens,
        PasswordContext::new(),
        config.default_page_size,
    ));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("docvault=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
            secret_key,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::from_file(path)?,
                None => ServerConfig::default(),
            };

            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir.into();
            }
            if let Some(secret_key) = secret_key {
                config.secret_key = Some(secret_key);
            } else if config.secret_key.is_none() {
                config.secret_key = std::env::var("DOCVAULT_SECRET_KEY").ok();
            }

            run_serve(config).await?;
        }
    }

    Ok(())
}
