use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wallet_core::withdrawals::BankType;

/// The envelope every endpoint responds with — `data` on success,
/// `error` on failure, never both (`lib/rest/internal/payloads/payloads.go`).
#[derive(Debug, Serialize)]
pub struct Response<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

impl Response<()> {
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ErrorResponse {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWithdrawRequest {
    pub user_id: Uuid,
    pub iban: String,
    pub amount: i64,
    pub bank_type: BankType,
}

#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub user_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub apply_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TransactionHistoryResponse {
    pub has_more: bool,
    pub transactions: Vec<wallet_core::ledger::LedgerEntry>,
}
