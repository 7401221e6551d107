mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wallet_core::withdrawals::{
    new_bank_client, WithdrawalService, WithdrawalStatus, WorkerConfig, WorkerJob, WorkerPool,
};

use crate::config::WithdrawBankerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let runtime_env = wallet_core::config::RuntimeEnv::from_env();
    wallet_core::telemetry::init("withdraw_banker", runtime_env);

    let config: WithdrawBankerConfig = match wallet_core::config::load_config() {
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

    let bank_client = match new_bank_client(&config.bank) {
        Ok(client) => Arc::from(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to construct bank client");
            std::process::exit(1);
        }
    };

    let service = Arc::new(WithdrawalService::new(pool));
    let cancel = CancellationToken::new();
    let worker_config: WorkerConfig = (&config.worker).into();
    let worker_pool = WorkerPool::spawn(worker_config, service.clone(), bank_client, cancel.clone());

    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_cancel.cancel();
    });

    run_reconciler(&service, &config, &worker_pool, &cancel).await;

    worker_pool.stop().await;
    tracing::info!("withdraw-banker stopped");
    Ok(())
}

/// Every sweep: `get_unfinished_withdraws(bank, prefix)` selects rows with
/// `status in {NEW, SENT}`; `NEW` enqueues a `send` job, `SENT` enqueues a
/// `check` job (spec §4.6). Enqueue is the only backpressure signal — when
/// the pool is saturated the sweep naturally slows down on `submit`.
async fn run_reconciler(
    service: &WithdrawalService,
    config: &WithdrawBankerConfig,
    worker_pool: &WorkerPool,
    cancel: &CancellationToken,
) {
    let sleep_interval = Duration::from_secs(config.reconciler.sleep_interval_secs);
    let bank = config.bank_type();

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match service
            .get_unfinished_withdraws(bank, &config.reconciler.id_prefix)
            .await
        {
            Ok(withdrawals) => {
                for withdrawal in withdrawals {
                    let job = match withdrawal.status {
                        WithdrawalStatus::New => WorkerJob::Send {
                            withdrawal_id: withdrawal.id,
                            iban: withdrawal.iban,
                            amount: withdrawal.amount,
                        },
                        WithdrawalStatus::Sent => WorkerJob::Check {
                            withdrawal_id: withdrawal.id,
                        },
                        WithdrawalStatus::Success | WithdrawalStatus::Failed => continue,
                    };

                    tokio::select! {
                        result = worker_pool.submit(job) => {
                            if result.is_err() {
                                tracing::warn!("worker pool closed while enqueuing job");
                                break;
                            }
                        }
                        _ = cancel.cancelled() => break,
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch unfinished withdrawals");
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
