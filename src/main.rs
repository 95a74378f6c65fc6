//! money_transfer server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────────┐
//! │  Config  │───▶│  Schema  │───▶│   Seed   │───▶│ HTTP Gateway │
//! │  (YAML)  │    │  (init)  │    │(optional)│    │   (axum)     │
//! └──────────┘    └──────────┘    └──────────┘    └──────────────┘
//! ```
//!
//! Usage: `money_transfer [--env <name>] [--port <port>]`

use std::sync::Arc;

use anyhow::Context;

use money_transfer::config::AppConfig;
use money_transfer::db::Database;
use money_transfer::gateway::{self, state::AppState};
use money_transfer::ledger::{Account, AccountRepository, PgAccountRepository, init_schema};
use money_transfer::logging::init_logging;
use money_transfer::service::BankService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&config);

    tracing::info!("Starting money_transfer in {} mode", env);

    let db = Arc::new(
        Database::connect(&config.database)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    init_schema(db.pool())
        .await
        .context("Failed to initialize ledger schema")?;

    let repo = Arc::new(PgAccountRepository::new(db.pool().clone()));
    if config.seed_demo_accounts {
        repo.seed(&Account::demo_fixtures())
            .await
            .context("Failed to seed demo accounts")?;
    }

    let bank = Arc::new(BankService::from_config(repo, &config.transfer));
    let state = Arc::new(AppState::new(bank, Some(db.clone())));

    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::run_server(&config.gateway.host, port, state, shutdown_signal()).await?;

    db.close().await;
    tracing::info!("Server exited properly");
    Ok(())
}
