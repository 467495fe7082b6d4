//! ventas CLI - backend service for the WhatsApp sales assistant
//!
//! `ventas serve` resolves database credentials (vault, environment,
//! `.env`, or the SQLite fallback), bootstraps the schema, and runs the
//! HTTP API.

use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use ventas_core::{config, CredentialSource, DbSettings};
use ventas_server::db;
use ventas_server::{run_server, AppState, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ventas",
    author,
    version,
    about = "Backend service for the WhatsApp sales assistant"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "VENTAS_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "VENTAS_PORT", default_value_t = 8000)]
    port: u16,

    /// Database URL, skipping credential resolution
    #[arg(long)]
    database_url: Option<String>,

    /// Allow any CORS origin (development only)
    #[arg(long)]
    cors_permissive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A packaged .env file is one of the supported credential sources;
    // load it before anything reads the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let settings = match args.database_url {
        Some(database_url) => DbSettings {
            database_url,
            source: CredentialSource::DatabaseUrl,
        },
        None => DbSettings::resolve().await?,
    };

    let pool = db::connect(&settings).await?;
    db::migrations::run(&pool).await?;

    let tenant = config::tenant_name();
    tracing::info!(%tenant, "serving tenant");

    let server_config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        cors_permissive: args.cors_permissive,
    };

    run_server(AppState::new(pool, tenant), server_config).await?;
    Ok(())
}
