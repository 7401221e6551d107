use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::CoreResult;
use crate::ledger::{LedgerStore, NewLedgerEntry};

use super::models::{Deposit, NewDeposit};
use super::repository::DepositRepository;

/// Drives a deposit through its two-step lifecycle: `create` blocks funds
/// immediately, `apply` moves them from blocked to available once `apply_at`
/// has passed. Both steps run inside a single transaction that also posts
/// the matching ledger entry, mirroring the original source's
/// `deposits/service.go` (spec §4.2).
pub struct DepositService {
    pool: PgPool,
}

impl DepositService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Blocks `amount` against the user's wallet and records the deposit as
    /// pending. `blocked_balance += amount`; the ledger entry carries
    /// `amount = 0, blocked_amount = +amount` so the invariant in
    /// `LedgerEntry` holds.
    pub async fn create(&self, new_deposit: NewDeposit) -> CoreResult<Deposit> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        let mut deposit = DepositRepository::insert(
            &mut tx,
            id,
            new_deposit.user_id,
            new_deposit.amount,
            new_deposit.apply_at,
            &new_deposit.description,
        )
        .await?;

        let mut wallet = LedgerStore::get_or_create_for_update(&mut tx, deposit.user_id).await?;
        wallet.blocked_balance += deposit.amount;
        LedgerStore::update(&mut tx, &wallet).await?;

        let entry = LedgerStore::create_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: wallet.user_id,
                amount: 0,
                blocked_amount: deposit.amount,
                reference: deposit.id,
                description: deposit.description.clone(),
            },
        )
        .await?;

        DepositRepository::set_block_transaction_id(&mut tx, deposit.id, entry.id).await?;
        deposit.block_transaction_id = entry.id;

        tx.commit().await?;
        Ok(deposit)
    }

    /// Moves `amount` from blocked to available. Idempotent: the reconciler
    /// only ever calls this on deposits selected by `get_applicable_deposits`,
    /// which already filters on `apply_transaction_id = 0` under
    /// `FOR UPDATE SKIP LOCKED`, so a deposit can't be applied twice even if
    /// two reconciler replicas race on overlapping shards.
    pub async fn apply(&self, deposit_id: Uuid) -> CoreResult<Option<Deposit>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut deposit) = DepositRepository::lock(&mut tx, deposit_id).await? else {
            return Ok(None);
        };
        if !deposit.needs_applying() {
            tx.rollback().await?;
            return Ok(Some(deposit));
        }

        let mut wallet = LedgerStore::get_or_create_for_update(&mut tx, deposit.user_id).await?;
        wallet.available_balance += deposit.amount;
        wallet.blocked_balance -= deposit.amount;
        LedgerStore::update(&mut tx, &wallet).await?;

        let entry = LedgerStore::create_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: wallet.user_id,
                amount: deposit.amount,
                blocked_amount: -deposit.amount,
                reference: deposit.id,
                description: deposit.description.clone(),
            },
        )
        .await?;

        DepositRepository::set_apply_transaction_id(&mut tx, deposit.id, entry.id).await?;
        deposit.apply_transaction_id = entry.id;

        tx.commit().await?;
        Ok(Some(deposit))
    }

    /// Deposits ready for `apply`, sharded by id prefix so multiple
    /// `deposit-applier` replicas can scan disjoint slices concurrently.
    pub async fn get_applicable_deposits(&self, id_prefix: &str) -> CoreResult<Vec<Deposit>> {
        DepositRepository::get_applicable(&self.pool, id_prefix).await
    }
}
