use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront::{app, config, is_production, AppState};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Product catalog storefront with an admin panel")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Directory holding products.json (overrides DATA_DIR)")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Directory served as static assets and uploads (overrides PUBLIC_DIR)")]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so ADMIN_CODE, PORT, etc. can live outside the shell
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.server.data_dir = dir;
    }
    if let Some(dir) = args.public_dir {
        config.server.public_dir = dir;
    }

    tracing::info!("Starting storefront in {:?} mode", config.environment);
    if config.uses_default_admin_code() {
        if is_production!() {
            tracing::warn!("ADMIN_CODE is not set; the development admin code is active in production");
        } else {
            tracing::info!("Using the development admin code; set ADMIN_CODE to override");
        }
    }

    let port = config.server.port;
    let state = AppState::init(config).await.context("failed to prepare data directories")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Storefront listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
