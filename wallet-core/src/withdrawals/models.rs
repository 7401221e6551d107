use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CoreError;

/// The withdrawal state machine's four states (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    New,
    Sent,
    Success,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::New => "new",
            WithdrawalStatus::Sent => "sent",
            WithdrawalStatus::Success => "success",
            WithdrawalStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Success | WithdrawalStatus::Failed)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(WithdrawalStatus::New),
            "sent" => Ok(WithdrawalStatus::Sent),
            "success" => Ok(WithdrawalStatus::Success),
            "failed" => Ok(WithdrawalStatus::Failed),
            other => Err(CoreError::InvalidState(format!(
                "unknown withdrawal status {other:?}"
            ))),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for WithdrawalStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for WithdrawalStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for WithdrawalStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

/// Which bank integration handles this withdrawal (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankType {
    Dummy,
    Saman,
    Mellat,
}

impl BankType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankType::Dummy => "dummy",
            BankType::Saman => "saman",
            BankType::Mellat => "mellat",
        }
    }
}

impl fmt::Display for BankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BankType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dummy" => Ok(BankType::Dummy),
            "saman" => Ok(BankType::Saman),
            "mellat" => Ok(BankType::Mellat),
            other => Err(CoreError::UnknownClientType(other.to_string())),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for BankType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for BankType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for BankType {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

/// A withdrawal request moving through `NEW -> SENT -> SUCCESS|FAILED`.
///
/// `block_transaction_id` is set at `Create`; `withdrawal_transaction_id` is
/// set by `Complete`; `reverser_transaction_id` is set by `Reverse`. These
/// are kept as three distinct columns rather than reusing one field for
/// both terminal outcomes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub bank: BankType,
    pub iban: String,
    pub amount: i64,
    pub status: WithdrawalStatus,
    pub block_transaction_id: i64,
    pub withdrawal_transaction_id: i64,
    pub reverser_transaction_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller requesting a new withdrawal.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub wallet_id: Uuid,
    pub bank: BankType,
    pub iban: String,
    pub amount: i64,
}
