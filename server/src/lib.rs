//! Threatlens backend: wraps OSV, VirusTotal and AlienVault OTX behind a
//! small JSON API and relays `/v1/query` to OSV for browser clients.

pub mod error;
mod routes;
pub mod state;

use std::sync::Arc;

use threatlens_core::Config;

use state::AppState;

pub use routes::NO_DATA;

/// Build the axum Router (useful for testing).
pub fn build_router(state: Arc<AppState>) -> axum::Router {
    routes::build_router(state)
}

/// Start the server and block until Ctrl+C.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let state = Arc::new(AppState::from_config(&config));

    if config.keys.virustotal.is_none() {
        tracing::warn!("VIRUSTOTAL_API_KEY not set; VirusTotal lookups will return no data");
    }
    if config.keys.alienvault.is_none() {
        tracing::warn!("ALIENVAULT_API_KEY not set; AlienVault lookups will return no data");
    }

    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, proxy_target = %state.proxy.target, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
