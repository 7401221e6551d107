use serde::Deserialize;
use wallet_core::config::{DatabaseConfig, ReconcilerConfig};
use wallet_core::withdrawals::{BankClientConfig, BankType, WorkerConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawBankerConfig {
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub reconciler: ReconcilerConfig,
    pub bank: BankClientConfig,
    #[serde(default)]
    pub worker: WorkerSettings,
}

impl WithdrawBankerConfig {
    pub fn bank_type(&self) -> BankType {
        self.bank.bank
    }
}

/// Deserializable mirror of `wallet_core::withdrawals::WorkerConfig` (which
/// carries a `Duration`, not directly `Deserialize`-friendly from seconds).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_count: default_retry_count(),
            backoff_secs: default_backoff_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_retry_count() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    2
}

fn default_queue_capacity() -> usize {
    64
}

impl From<&WorkerSettings> for WorkerConfig {
    fn from(settings: &WorkerSettings) -> Self {
        WorkerConfig {
            concurrency: settings.concurrency,
            retry_count: settings.retry_count,
            backoff: std::time::Duration::from_secs(settings.backoff_secs),
            queue_capacity: settings.queue_capacity,
        }
    }
}
