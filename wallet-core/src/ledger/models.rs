use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's wallet.
///
/// Key design decisions (same reasoning the teacher's `models.rs` states for
/// its own `Wallet`, adapted to this spec's representation):
/// - balances are signed `i64` minor units, never a float — avoids rounding
///   drift entirely rather than trading it for arbitrary precision.
/// - there is no optimistic-locking `version` column; concurrency is instead
///   serialised by the pessimistic row lock `get_or_create_for_update` takes,
///   per spec.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub available_balance: i64,
    pub blocked_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable, append-only ledger entry (posting).
///
/// Invariant (spec §3): for every wallet, `sum(amount) == available_balance`
/// and `sum(blocked_amount) == blocked_balance` across that wallet's entries.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub wallet_id: Uuid,
    pub amount: i64,
    pub blocked_amount: i64,
    pub reference: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a new ledger entry; `id`/`created_at` are assigned
/// by the insert itself.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub wallet_id: Uuid,
    pub amount: i64,
    pub blocked_amount: i64,
    pub reference: Uuid,
    pub description: String,
}
