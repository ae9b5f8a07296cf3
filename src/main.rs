//! LINE webhook relay.
//!
//! Main entry point. Loads configuration, connects to PostgreSQL, applies
//! migrations, builds the LINE client and serves HTTP until SIGINT or
//! SIGTERM.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use relay_api::{start_server, AppState, Config};
use relay_core::Storage;
use relay_line::LineClient;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting LINE relay");
    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        line_api_base_url = %config.line_api_base_url,
        "Configuration loaded"
    );

    let addr = config.parse_server_addr()?;

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    let storage = Storage::new(db_pool.clone());
    storage.migrate().await.context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let line_client =
        LineClient::new(config.to_line_config()).context("Failed to create LINE client")?;

    let state = AppState::new(Arc::new(storage), Arc::new(line_client));

    info!(addr = %addr, "Relay is ready to receive webhooks");

    start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("HTTP server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("Relay shutdown complete");
    Ok(())
}

/// Initializes tracing, preferring `RUST_LOG` when it parses.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool and verifies it with a probe query.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to create database connection pool")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    Ok(pool)
}
