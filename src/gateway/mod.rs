//! HTTP Gateway
//!
//! Thin transport over [`crate::service::BankService`]: JSON in, unified
//! [`types::ApiResponse`] out, ledger errors mapped to HTTP statuses.

pub mod handlers;
pub mod state;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use state::AppState;

/// Build the gateway router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .route("/health", get(handlers::health_check))
                .route("/transfer", post(handlers::create_transfer))
                .route("/balance/{account}", get(handlers::get_balance)),
        )
        .with_state(state)
}

/// Start HTTP Gateway server and serve until `shutdown` resolves
pub async fn run_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        "Gateway listening on http://{} (ledger: {})",
        addr,
        state.bank.repository_name()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Gateway server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}
