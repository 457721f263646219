use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use seva_space_api::auth::TokenService;
use seva_space_api::config;
use seva_space_api::database::{DatabaseManager, PgStore, Store};
use seva_space_api::services::AccountService;
use seva_space_api::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // config.env / .env before the config singleton is first read
    config::load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    config.validate().map_err(anyhow::Error::msg)?;
    info!("Starting Seva Space API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    if AccountService::new(store.clone()).ensure_admin(&config.admin).await?.is_none() {
        info!("Administrator already present, skipping seed");
    }

    let tokens = TokenService::new(&config.security.jwt_secret, config.security.jwt_expiry)?;
    let state = AppState::new(store, tokens, config.uploads.clone(), config.pagination.clone());
    let app = routes::app(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Seva Space API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
