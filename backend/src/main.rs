use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use shared::StartupReconciliation;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod domain;
mod rest;
mod storage;

use config::ServerConfig;
use rest::AppState;
use storage::db::DbConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    let state = AppState::new(db.clone());

    // Run the reconciliation sweep once at startup. It must not block serving,
    // but its outcome is surfaced by /health rather than swallowed.
    {
        let state = state.clone();
        tokio::spawn(async move {
            let result = state.reconciliation.run_today().await;
            let mut startup = state.startup_reconciliation.write().await;
            *startup = match result {
                Ok(outcome) => {
                    info!(
                        "Startup reconciliation processed {} rest days ({} skipped)",
                        outcome.processed, outcome.skipped
                    );
                    StartupReconciliation::Completed(outcome)
                }
                Err(e) => {
                    error!("Startup reconciliation failed: {}", e);
                    StartupReconciliation::Failed {
                        error: e.to_string(),
                    }
                }
            };
        });
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = rest::router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
