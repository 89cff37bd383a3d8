use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::database::open_store;
use crate::router::app;
use crate::state::AppState;

/// Opens the configured store and serves the API until ctrl-c.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Tenancy API in {:?} mode", config.environment);
    info!("Tenant access mode: {:?}", config.tenancy.tenant_access);

    let store = open_store(&config.database)
        .await
        .context("failed to open entity store")?;

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let app = app(AppState::new(store, config));

    info!("Tenancy API listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return std::future::pending().await;
    }
    info!("Shutdown signal received");
}
