use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};

use super::models::{LedgerEntry, NewLedgerEntry, Wallet};

/// The ledger store and wallet mutation engine (spec §4.1).
///
/// All methods here operate on a caller-supplied `PgConnection` so that a
/// single business operation (deposit `Create`/`Apply`, withdrawal
/// `Create`/`Complete`/`Reverse`) can open one `sqlx::Transaction`, drive it
/// through a deposit/withdrawal repository call *and* a ledger call, and
/// commit once. This is the Rust equivalent of the original source's
/// "construct a ledger-store handle over the entity store's open
/// transaction" design (spec §9): instead of a separate handle type, the
/// transaction's `&mut PgConnection` *is* the shared handle, passed by
/// reference into whichever `LedgerStore` method is needed.
pub struct LedgerStore;

impl LedgerStore {
    /// Non-locking read-through: fetch the wallet, creating it with zero
    /// balances if this is the first reference.
    pub async fn get_or_create(conn: &mut PgConnection, user_id: Uuid) -> CoreResult<Wallet> {
        Self::fetch_or_insert(conn, user_id, false).await
    }

    /// Same semantics as `get_or_create`, plus an exclusive row lock held
    /// until the surrounding transaction ends. Every balance mutation must
    /// go through this to serialise concurrent writers on the same wallet.
    pub async fn get_or_create_for_update(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> CoreResult<Wallet> {
        Self::fetch_or_insert(conn, user_id, true).await
    }

    async fn fetch_or_insert(
        conn: &mut PgConnection,
        user_id: Uuid,
        for_update: bool,
    ) -> CoreResult<Wallet> {
        let existing = if for_update {
            sqlx::query_as::<_, Wallet>(
                r#"
                SELECT user_id, available_balance, blocked_balance, created_at, updated_at
                FROM wallets
                WHERE user_id = $1
                FOR UPDATE
                "#,
            )
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
        } else {
            sqlx::query_as::<_, Wallet>(
                r#"
                SELECT user_id, available_balance, blocked_balance, created_at, updated_at
                FROM wallets
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
        };

        if let Some(wallet) = existing {
            return Ok(wallet);
        }

        let now = Utc::now();
        // Created lazily on first reference (spec §3). A concurrent creator
        // racing us loses the insert and falls through to the unique
        // violation below; we simply re-fetch under lock in that case.
        let inserted = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (user_id, available_balance, blocked_balance, created_at, updated_at)
            VALUES ($1, 0, 0, $2, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING user_id, available_balance, blocked_balance, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(wallet) = inserted {
            return Ok(wallet);
        }

        // Lost the race: the row exists now, fetch it (locking if asked).
        let lock_clause = if for_update { "FOR UPDATE" } else { "" };
        let query = format!(
            "SELECT user_id, available_balance, blocked_balance, created_at, updated_at \
             FROM wallets WHERE user_id = $1 {lock_clause}"
        );
        let wallet = sqlx::query_as::<_, Wallet>(&query)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(CoreError::WalletNotFound(user_id))?;
        Ok(wallet)
    }

    /// Writes only `available_balance`, `blocked_balance` and `updated_at`,
    /// per spec §4.1.
    pub async fn update(conn: &mut PgConnection, wallet: &Wallet) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET available_balance = $1, blocked_balance = $2, updated_at = $3
            WHERE user_id = $4
            "#,
        )
        .bind(wallet.available_balance)
        .bind(wallet.blocked_balance)
        .bind(Utc::now())
        .bind(wallet.user_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Insert a ledger entry; the database assigns a monotonic id and
    /// `created_at`.
    pub async fn create_entry(
        conn: &mut PgConnection,
        entry: NewLedgerEntry,
    ) -> CoreResult<LedgerEntry> {
        let row = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (wallet_id, amount, blocked_amount, reference, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, wallet_id, amount, blocked_amount, reference, description, created_at
            "#,
        )
        .bind(entry.wallet_id)
        .bind(entry.amount)
        .bind(entry.blocked_amount)
        .bind(entry.reference)
        .bind(entry.description)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Newest-first, offset pagination. `has_more` is true iff the next
    /// offset would yield at least one more row.
    pub async fn get_entries(
        pool: &PgPool,
        wallet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> CoreResult<(Vec<LedgerEntry>, bool)> {
        let offset = (page - 1).max(0) * page_size;

        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, wallet_id, amount, blocked_amount, reference, description, created_at
            FROM ledger_entries
            WHERE wallet_id = $1
            ORDER BY id DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(wallet_id)
        .bind(offset)
        .bind(page_size)
        .fetch_all(pool)
        .await?;

        let has_more = if entries.len() < page_size as usize {
            false
        } else {
            sqlx::query_scalar::<_, bool>(
                r#"SELECT EXISTS(SELECT 1 FROM ledger_entries WHERE wallet_id = $1 ORDER BY id DESC OFFSET $2 LIMIT 1)"#,
            )
            .bind(wallet_id)
            .bind(offset + page_size)
            .fetch_one(pool)
            .await?
        };

        Ok((entries, has_more))
    }
}
