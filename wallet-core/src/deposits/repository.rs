use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::CoreResult;

use super::models::Deposit;

/// Low-level deposit persistence. Mirrors the split the original source
/// draws between `deposits/repository` (dumb CRUD) and `deposits/service.go`
/// (the business operation that also drives the ledger store) — see
/// `super::service::DepositService`.
pub struct DepositRepository;

impl DepositRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
        amount: i64,
        apply_at: DateTime<Utc>,
        description: &str,
    ) -> CoreResult<Deposit> {
        let now = Utc::now();
        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
            INSERT INTO deposits (id, user_id, amount, apply_at, description, block_transaction_id, apply_transaction_id, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, 0, $6)
            RETURNING id, user_id, amount, apply_at, description, block_transaction_id, apply_transaction_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(amount)
        .bind(apply_at)
        .bind(description)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        Ok(deposit)
    }

    pub async fn set_block_transaction_id(
        conn: &mut PgConnection,
        deposit_id: Uuid,
        block_transaction_id: i64,
    ) -> CoreResult<()> {
        sqlx::query("UPDATE deposits SET block_transaction_id = $1 WHERE id = $2")
            .bind(block_transaction_id)
            .bind(deposit_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_apply_transaction_id(
        conn: &mut PgConnection,
        deposit_id: Uuid,
        apply_transaction_id: i64,
    ) -> CoreResult<()> {
        sqlx::query("UPDATE deposits SET apply_transaction_id = $1 WHERE id = $2")
            .bind(apply_transaction_id)
            .bind(deposit_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Row-locks a single deposit for the `Apply` step. `FOR UPDATE` (no
    /// `SKIP LOCKED` here: the caller already selected this specific row via
    /// `get_applicable` and wants to wait rather than silently drop it).
    pub async fn lock(conn: &mut PgConnection, deposit_id: Uuid) -> CoreResult<Option<Deposit>> {
        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
            SELECT id, user_id, amount, apply_at, description, block_transaction_id, apply_transaction_id, created_at
            FROM deposits
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(deposit_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(deposit)
    }

    /// Deposits whose id starts with `id_prefix`, whose `apply_at` has
    /// passed, and which have not yet been applied — `FOR UPDATE SKIP
    /// LOCKED` so multiple applier replicas shard cleanly by prefix without
    /// colliding (spec §4.2).
    pub async fn get_applicable(pool: &PgPool, id_prefix: &str) -> CoreResult<Vec<Deposit>> {
        let pattern = format!("{id_prefix}%");
        let deposits = sqlx::query_as::<_, Deposit>(
            r#"
            SELECT id, user_id, amount, apply_at, description, block_transaction_id, apply_transaction_id, created_at
            FROM deposits
            WHERE apply_transaction_id = 0
              AND apply_at < now()
              AND id::text LIKE $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;
        Ok(deposits)
    }
}
