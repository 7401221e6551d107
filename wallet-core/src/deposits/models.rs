use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled deposit (spec §3).
///
/// `apply_transaction_id == 0` is the sole "needs applying" predicate: a
/// deposit is created in the "blocked" state (funds immediately credit
/// `blocked`, not yet `available`) and transitions to "applied" once the
/// reconciler moves the funds to `available` at/after `apply_at`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub apply_at: DateTime<Utc>,
    pub description: String,
    pub block_transaction_id: i64,
    pub apply_transaction_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Deposit {
    /// The sole "needs applying" predicate (spec §3/§4.2).
    pub fn needs_applying(&self) -> bool {
        self.apply_transaction_id == 0
    }
}

/// Fields supplied by a caller creating a new deposit; the rest are filled
/// in by `DepositService::create`.
#[derive(Debug, Clone)]
pub struct NewDeposit {
    pub user_id: Uuid,
    pub amount: i64,
    pub apply_at: DateTime<Utc>,
    pub description: String,
}
