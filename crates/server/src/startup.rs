//! Server startup: store selection, shared state, and the listen loop.

use std::sync::Arc;

use tracing::info;

use rota_core::Config;

use crate::router::build_router;
use crate::state::AppState;

/// Open the configured store and wrap it in the services.
pub fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = rota_storage::open_store(&config.storage)?;
    Ok(Arc::new(AppState::new(store, config.intervals)))
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    config.log_summary();
    let state = build_app_state(config)?;
    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
