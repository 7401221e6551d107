mod dummy;

pub use dummy::DummyBankClient;

use async_trait::async_trait;

use crate::errors::{CoreError, CoreResult};

use super::models::BankType;

/// Outcome of a `BankClient::send` or `BankClient::get_status` call. The
/// empty string the original source allows (an unknown/pending signal) is
/// modelled as `Unknown` rather than a bare string (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSignal {
    Success,
    Failed,
    Sent,
    Unknown,
}

/// A bank payout integration. One instance is shared across all worker pool
/// tasks, so implementations must be `Send + Sync`.
#[async_trait]
pub trait BankClient: Send + Sync {
    async fn send(&self, iban: &str, amount: i64, track_id: &str) -> CoreResult<BankSignal>;
    async fn get_status(&self, track_id: &str) -> CoreResult<BankSignal>;
}

/// Bank client config, decoded per `BankType` (spec §4.4). Only the dummy
/// schema is meaningful today; `saman`/`mellat` configs are accepted but the
/// clients themselves are not implemented.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BankClientConfig {
    pub bank: BankType,
    /// Probability in `[0, 1]` that the dummy client's `send` fails.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

fn default_failure_rate() -> f64 {
    0.0
}

/// Constructs the configured bank client, or fails with `UnknownClientType`,
/// `InvalidConfig`, or `ClientTypeIsNotImplemented` per spec §4.4.
pub fn new_bank_client(config: &BankClientConfig) -> CoreResult<Box<dyn BankClient>> {
    if !(0.0..=1.0).contains(&config.failure_rate) {
        return Err(CoreError::InvalidConfig);
    }
    match config.bank {
        BankType::Dummy => Ok(Box::new(DummyBankClient::new(config.failure_rate))),
        BankType::Saman => Err(CoreError::ClientTypeIsNotImplemented(
            BankType::Saman.to_string(),
        )),
        BankType::Mellat => Err(CoreError::ClientTypeIsNotImplemented(
            BankType::Mellat.to_string(),
        )),
    }
}
