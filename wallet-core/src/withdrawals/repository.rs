use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::CoreResult;

use super::models::{BankType, Withdrawal, WithdrawalStatus};

/// Low-level withdrawal persistence, mirroring the split between
/// `withdraws/repository` (dumb CRUD) and `withdraws/services.go` (the
/// state machine that also drives the ledger store) in the original source.
pub struct WithdrawalRepository;

impl WithdrawalRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        id: Uuid,
        wallet_id: Uuid,
        bank: BankType,
        iban: &str,
        amount: i64,
    ) -> CoreResult<Withdrawal> {
        let now = chrono::Utc::now();
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            INSERT INTO withdrawals
                (id, wallet_id, bank, iban, amount, status, block_transaction_id,
                 withdrawal_transaction_id, reverser_transaction_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, 0, $7, $7)
            RETURNING id, wallet_id, bank, iban, amount, status, block_transaction_id,
                      withdrawal_transaction_id, reverser_transaction_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(wallet_id)
        .bind(bank)
        .bind(iban)
        .bind(amount)
        .bind(WithdrawalStatus::New)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        Ok(withdrawal)
    }

    /// Row-locks a single withdrawal for a state transition. No `SKIP
    /// LOCKED`: the caller targets this exact row and must wait for any
    /// concurrent holder rather than silently skip it.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> CoreResult<Option<Withdrawal>> {
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, wallet_id, bank, iban, amount, status, block_transaction_id,
                   withdrawal_transaction_id, reverser_transaction_id, created_at, updated_at
            FROM withdrawals
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(withdrawal)
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: WithdrawalStatus,
    ) -> CoreResult<()> {
        sqlx::query("UPDATE withdrawals SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_withdrawal_transaction_id(
        conn: &mut PgConnection,
        id: Uuid,
        status: WithdrawalStatus,
        withdrawal_transaction_id: i64,
    ) -> CoreResult<()> {
        sqlx::query(
            "UPDATE withdrawals SET status = $1, withdrawal_transaction_id = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(status)
        .bind(withdrawal_transaction_id)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn set_reverser_transaction_id(
        conn: &mut PgConnection,
        id: Uuid,
        status: WithdrawalStatus,
        reverser_transaction_id: i64,
    ) -> CoreResult<()> {
        sqlx::query(
            "UPDATE withdrawals SET status = $1, reverser_transaction_id = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(status)
        .bind(reverser_transaction_id)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Withdrawals still in flight (`NEW` or `SENT`) for the given bank,
    /// restricted to the reconciler's id-prefix shard (spec §4.6).
    pub async fn get_unfinished_withdraws(
        pool: &PgPool,
        bank: BankType,
        id_prefix: &str,
    ) -> CoreResult<Vec<Withdrawal>> {
        let pattern = format!("{id_prefix}%");
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, wallet_id, bank, iban, amount, status, block_transaction_id,
                   withdrawal_transaction_id, reverser_transaction_id, created_at, updated_at
            FROM withdrawals
            WHERE bank = $1
              AND status IN ('new', 'sent')
              AND id::text LIKE $2
            ORDER BY created_at
            "#,
        )
        .bind(bank)
        .bind(pattern)
        .fetch_all(pool)
        .await?;
        Ok(withdrawals)
    }
}
