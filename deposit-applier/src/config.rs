use serde::Deserialize;
use wallet_core::config::{DatabaseConfig, ReconcilerConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct DepositApplierConfig {
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub reconciler: ReconcilerConfig,
}
