//! HTTP JSON API for the ledger dashboard
//!
//! Routes are organized into modules:
//! - routes::charts: Expense, monthly and net worth charts
//! - routes::accounts: Account list and ledger version
//! - routes::settings: Ledger settings, cache state, prefetch

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use ledgerdash_config::Config;
use ledgerdash_core::Dashboard;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{api_accounts, api_version};
    use routes::charts::{api_expense_chart, api_expense_totals, api_monthly_chart, api_net_worth};
    use routes::settings::{api_prefetch, api_settings, api_update_settings};

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(api_version))
        .route("/api/accounts", get(api_accounts))
        .route("/api/charts/expenses", get(api_expense_chart))
        .route("/api/charts/expenses/totals", get(api_expense_totals))
        .route("/api/charts/monthly", get(api_monthly_chart))
        .route("/api/charts/net-worth", get(api_net_worth))
        .route("/api/settings", get(api_settings).put(api_update_settings))
        .route("/api/prefetch", post(api_prefetch))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until the process is
/// interrupted.
pub async fn start_server(config: Config, dashboard: Arc<Dashboard>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState { dashboard, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting ledgerdash server on http://{}", addr);
    log::info!("Chart data under http://{}/api/charts/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
