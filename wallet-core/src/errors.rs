use thiserror::Error;

/// Errors surfaced by the ledger store, wallet mutation engine, deposit
/// service and withdrawal state machine.
///
/// Mirrors the split in the teacher's `wallet-service/src/errors.rs`:
/// validation-ish variants that a caller should treat as a 4xx, a handful of
/// state-machine-specific variants, and a catch-all wrapping `sqlx::Error`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("cannot call this operation on a withdrawal in this state: {0}")]
    InvalidState(String),

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("wallet not found: {0}")]
    WalletNotFound(uuid::Uuid),

    #[error("deposit not found: {0}")]
    DepositNotFound(uuid::Uuid),

    #[error("withdrawal not found: {0}")]
    WithdrawalNotFound(uuid::Uuid),

    #[error("unknown bank client type: {0}")]
    UnknownClientType(String),

    #[error("invalid bank client config")]
    InvalidConfig,

    #[error("bank client type is not implemented: {0}")]
    ClientTypeIsNotImplemented(String),

    #[error("duplicate payout for track id {0}")]
    DuplicatePayout(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
