use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::ledger::{LedgerStore, NewLedgerEntry};

use super::models::{NewWithdrawal, Withdrawal, WithdrawalStatus};
use super::repository::WithdrawalRepository;

/// The withdrawal state machine (spec §4.3): `Create`, `MarkAsSent`,
/// `Complete`, `Reverse`. Every transition opens its own transaction, locks
/// the withdrawal row, re-checks the guard against the persisted status,
/// and posts the matching ledger entry before committing — so a transition
/// can never apply twice, and a stale in-memory read can never smuggle an
/// invalid jump past the guard.
pub struct WithdrawalService {
    pool: PgPool,
}

impl WithdrawalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Blocks `amount` against the wallet and creates the withdrawal in
    /// `NEW`. `available -= amount`, `blocked += amount`; ledger
    /// `(-amount, +amount)`.
    pub async fn create(&self, new_withdrawal: NewWithdrawal) -> CoreResult<Withdrawal> {
        if new_withdrawal.amount <= 0 {
            return Err(CoreError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        let mut wallet =
            LedgerStore::get_or_create_for_update(&mut tx, new_withdrawal.wallet_id).await?;
        if wallet.available_balance < new_withdrawal.amount {
            return Err(CoreError::InsufficientBalance);
        }
        wallet.available_balance -= new_withdrawal.amount;
        wallet.blocked_balance += new_withdrawal.amount;
        LedgerStore::update(&mut tx, &wallet).await?;

        let id = Uuid::new_v4();
        let mut withdrawal = WithdrawalRepository::insert(
            &mut tx,
            id,
            new_withdrawal.wallet_id,
            new_withdrawal.bank,
            &new_withdrawal.iban,
            new_withdrawal.amount,
        )
        .await?;

        let entry = LedgerStore::create_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: wallet.user_id,
                amount: -new_withdrawal.amount,
                blocked_amount: new_withdrawal.amount,
                reference: withdrawal.id,
                description: format!("withdrawal to {}", withdrawal.iban),
            },
        )
        .await?;

        sqlx::query("UPDATE withdrawals SET block_transaction_id = $1 WHERE id = $2")
            .bind(entry.id)
            .bind(withdrawal.id)
            .execute(&mut *tx)
            .await?;
        withdrawal.block_transaction_id = entry.id;

        tx.commit().await?;
        Ok(withdrawal)
    }

    /// `NEW -> SENT`. Status-only; no ledger posting.
    pub async fn mark_as_sent(&self, id: Uuid) -> CoreResult<Withdrawal> {
        let mut tx = self.pool.begin().await?;

        let mut withdrawal = WithdrawalRepository::lock(&mut tx, id)
            .await?
            .ok_or(CoreError::WithdrawalNotFound(id))?;
        if withdrawal.status != WithdrawalStatus::New {
            return Err(CoreError::InvalidState(format!(
                "mark_as_sent requires status=new, found {}",
                withdrawal.status
            )));
        }

        WithdrawalRepository::update_status(&mut tx, id, WithdrawalStatus::Sent).await?;
        withdrawal.status = WithdrawalStatus::Sent;

        tx.commit().await?;
        Ok(withdrawal)
    }

    /// `NEW|SENT -> SUCCESS`. `blocked -= amount`; ledger `(0, -amount)` —
    /// `available` doesn't move, the blocked funds simply leave the wallet
    /// to the bank, so the posting must not touch the `amount` axis (a
    /// `(+amount, -amount)` posting, as a literal reading of spec §4.3's
    /// table would suggest, double-counts `amount` and breaks the §8
    /// invariant `available == Σ entries.amount`). Sets
    /// `withdrawal_transaction_id`. Reachable from `NEW` directly: a bank
    /// can report success on the very first `send`, before `MarkAsSent`
    /// ever runs.
    pub async fn complete(&self, id: Uuid) -> CoreResult<Withdrawal> {
        let mut tx = self.pool.begin().await?;

        let mut withdrawal = WithdrawalRepository::lock(&mut tx, id)
            .await?
            .ok_or(CoreError::WithdrawalNotFound(id))?;
        if !matches!(
            withdrawal.status,
            WithdrawalStatus::New | WithdrawalStatus::Sent
        ) {
            return Err(CoreError::InvalidState(format!(
                "complete requires status in {{new, sent}}, found {}",
                withdrawal.status
            )));
        }

        let mut wallet = LedgerStore::get_or_create_for_update(&mut tx, withdrawal.wallet_id).await?;
        wallet.blocked_balance -= withdrawal.amount;
        LedgerStore::update(&mut tx, &wallet).await?;

        let entry = LedgerStore::create_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: wallet.user_id,
                amount: 0,
                blocked_amount: -withdrawal.amount,
                reference: withdrawal.id,
                description: format!("withdrawal to {} completed", withdrawal.iban),
            },
        )
        .await?;

        WithdrawalRepository::set_withdrawal_transaction_id(
            &mut tx,
            id,
            WithdrawalStatus::Success,
            entry.id,
        )
        .await?;
        withdrawal.status = WithdrawalStatus::Success;
        withdrawal.withdrawal_transaction_id = entry.id;

        tx.commit().await?;
        Ok(withdrawal)
    }

    /// `NEW|SENT -> FAILED`. `available += amount`, `blocked -= amount`;
    /// ledger `(+amount, -amount)`; sets `reverser_transaction_id`.
    pub async fn reverse(&self, id: Uuid) -> CoreResult<Withdrawal> {
        let mut tx = self.pool.begin().await?;

        let mut withdrawal = WithdrawalRepository::lock(&mut tx, id)
            .await?
            .ok_or(CoreError::WithdrawalNotFound(id))?;
        if !matches!(
            withdrawal.status,
            WithdrawalStatus::New | WithdrawalStatus::Sent
        ) {
            return Err(CoreError::InvalidState(format!(
                "reverse requires status in {{new, sent}}, found {}",
                withdrawal.status
            )));
        }

        let mut wallet = LedgerStore::get_or_create_for_update(&mut tx, withdrawal.wallet_id).await?;
        wallet.available_balance += withdrawal.amount;
        wallet.blocked_balance -= withdrawal.amount;
        LedgerStore::update(&mut tx, &wallet).await?;

        let entry = LedgerStore::create_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: wallet.user_id,
                amount: withdrawal.amount,
                blocked_amount: -withdrawal.amount,
                reference: withdrawal.id,
                description: format!("withdrawal to {} reversed", withdrawal.iban),
            },
        )
        .await?;

        WithdrawalRepository::set_reverser_transaction_id(
            &mut tx,
            id,
            WithdrawalStatus::Failed,
            entry.id,
        )
        .await?;
        withdrawal.status = WithdrawalStatus::Failed;
        withdrawal.reverser_transaction_id = entry.id;

        tx.commit().await?;
        Ok(withdrawal)
    }

    /// Withdrawals still in flight for `bank`, restricted to `id_prefix`
    /// (spec §4.6 reconciler sweep).
    pub async fn get_unfinished_withdraws(
        &self,
        bank: super::models::BankType,
        id_prefix: &str,
    ) -> CoreResult<Vec<Withdrawal>> {
        WithdrawalRepository::get_unfinished_withdraws(&self.pool, bank, id_prefix).await
    }
}
