/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::MockState;

pub fn create_router(state: Arc<MockState>) -> Router {
    // Configure CORS to allow requests from wallet tools/tests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // ElectrumX endpoints
        .route("/v5/electrumx/balance", post(get_balances))
        .route("/v5/electrumx/utxos", post(get_utxos))

        // SLP endpoints
        .route("/v5/slp/hydrateUtxos", post(hydrate_utxos))

        // Transaction endpoints
        .route(
            "/v5/rawtransactions/sendRawTransaction/:hex",
            get(send_raw_transaction),
        )

        // Shared state
        .with_state(state)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: Arc<MockState>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Indexer mock listening on http://{}", addr);
    log::info!("📡 Wallet base URL: http://{}/v5/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve on an OS-assigned localhost port in the background
pub async fn spawn_ephemeral(
    state: Arc<MockState>,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Indexer mock stopped: {}", e);
        }
    });

    Ok((addr, handle))
}
