mod auth;
mod config;
mod errors;
mod handlers;
mod payloads;
mod state;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use wallet_core::deposits::DepositService;
use wallet_core::withdrawals::WithdrawalService;

use crate::config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let runtime_env = wallet_core::config::RuntimeEnv::from_env();
    wallet_core::telemetry::init("api", runtime_env);

    let config: ApiConfig = match wallet_core::config::load_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let pool = match wallet_core::db::connect(&config.database).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to database");
            std::process::exit(1);
        }
    };

    let state = AppState {
        pool: pool.clone(),
        deposit_service: Arc::new(DepositService::new(pool.clone())),
        withdrawal_service: Arc::new(WithdrawalService::new(pool)),
        auth_token: Arc::from(config.auth_token.as_str()),
    };

    let app = Router::new()
        .route("/api/v1/balance", get(handlers::get_balance))
        .route("/api/v1/transactions", get(handlers::get_transactions))
        .route("/api/v1/withdraw", post(handlers::create_withdraw))
        .route("/api/v1/deposit", post(handlers::create_deposit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "api listening");

    let cancel = tokio_util::sync::CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_cancel.cancel();
    });

    let shutdown_timeout = std::time::Duration::from_secs(config.shutdown_timeout_secs);
    let shutdown_wait = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown_wait.cancelled().await })
            .await
    });

    cancel.cancelled().await;
    if tokio::time::timeout(shutdown_timeout, server).await.is_err() {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "graceful shutdown timed out, forcing exit"
        );
    }

    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
