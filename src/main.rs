use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ritefolio_admin::app::{app, AppState};
use ritefolio_admin::config::AppConfig;
use ritefolio_admin::database::{DatabaseManager, Gateway};

/// Admin API for the RiteFolio reference tables
#[derive(Parser, Debug)]
#[command(name = "ritefolio-admin", version)]
struct Args {
    /// Listen port; overrides ADMIN_API_PORT and PORT
    #[arg(long)]
    port: Option<u16>,

    /// Ping the default database and exit
    #[arg(long)]
    check_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so PG_* settings apply under cargo run
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    tracing::info!("Starting RiteFolio admin API in {:?} mode", config.environment);

    let manager = Arc::new(DatabaseManager::new(config.database.clone()));

    if args.check_db {
        let result = manager.ping(None).await;
        manager.close_all().await;
        result.with_context(|| {
            format!("database {} is unreachable", manager.default_database())
        })?;
        println!("Database {} is reachable", manager.default_database());
        return Ok(());
    }

    let state = AppState::new(manager.clone());
    let router = app(state, &config);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("RiteFolio admin API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close_all().await;
    tracing::info!("Database pools closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
