mod config;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wallet_core::deposits::DepositService;

use crate::config::DepositApplierConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let runtime_env = wallet_core::config::RuntimeEnv::from_env();
    wallet_core::telemetry::init("deposit_applier", runtime_env);

    let config: DepositApplierConfig = match wallet_core::config::load_config() {
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

    let service = DepositService::new(pool);
    let cancel = CancellationToken::new();

    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_cancel.cancel();
    });

    run_reconciler(&service, &config.reconciler, &cancel).await;

    tracing::info!("deposit-applier stopped");
    Ok(())
}

/// Every sweep: `get_applicable_deposits(prefix)` then sequentially `apply`
/// each (spec §4.7). No worker pool — applies are short and cheap, and
/// `FOR UPDATE SKIP LOCKED` already lets multiple replicas share a prefix
/// safely, though horizontal sharding by prefix is the recommended
/// deployment.
async fn run_reconciler(
    service: &DepositService,
    config: &wallet_core::config::ReconcilerConfig,
    cancel: &CancellationToken,
) {
    let sleep_interval = Duration::from_secs(config.sleep_interval_secs);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match service.get_applicable_deposits(&config.id_prefix).await {
            Ok(deposits) => {
                if !deposits.is_empty() {
                    tracing::info!(count = deposits.len(), "applying deposits");
                }
                for deposit in deposits {
                    if let Err(err) = service.apply(deposit.id).await {
                        tracing::warn!(deposit_id = %deposit.id, error = %err, "failed to apply deposit");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch applicable deposits");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(sleep_interval) => {}
            _ = cancel.cancelled() => break,
        }
    }
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
