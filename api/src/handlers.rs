use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use chrono::Utc;
use tower_http::request_id::RequestId;
use uuid::Uuid;
use wallet_core::deposits::NewDeposit;
use wallet_core::ledger::LedgerStore;
use wallet_core::withdrawals::NewWithdrawal;

use crate::errors::ApiError;
use crate::payloads::{
    CreateDepositRequest, CreateWithdrawRequest, Response as Envelope,
    TransactionHistoryResponse,
};
use crate::state::AppState;

fn trace_id(request_id: &Option<axum::Extension<RequestId>>) -> String {
    request_id
        .as_ref()
        .and_then(|id| id.0.header_value().to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// `user_id` is required on both GET endpoints; parsed the same way the
/// original handler does (`ctx.Query("user_id")`, then `uuid.Parse`), with
/// the matching `no_user_id_provided` / `invalid_user_id` error codes.
fn parse_user_id(params: &HashMap<String, String>) -> Result<Uuid, ApiError> {
    let raw = params
        .get("user_id")
        .ok_or(ApiError::MissingParam("user_id"))?;
    raw.parse::<Uuid>().map_err(|_| ApiError::InvalidParam("user_id"))
}

/// `GET /api/v1/balance`.
pub async fn get_balance(
    State(state): State<AppState>,
    request_id: Option<axum::Extension<RequestId>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let trace = trace_id(&request_id);

    let user_id = match parse_user_id(&params) {
        Ok(id) => id,
        Err(err) => return err.into_response_with_trace(&trace),
    };

    let result: Result<_, ApiError> = async {
        let mut conn = state
            .pool
            .acquire()
            .await
            .map_err(wallet_core::CoreError::from)?;
        let wallet = LedgerStore::get_or_create(&mut conn, user_id).await?;
        Ok(wallet)
    }
    .await;

    match result {
        Ok(wallet) => (StatusCode::OK, Json(Envelope::ok(wallet))).into_response(),
        Err(err) => err.into_response_with_trace(&trace),
    }
}

/// `GET /api/v1/transactions`. `page`/`page_size` default to `1`/`20`
/// (`getPageAndPageSize` in the original handler).
pub async fn get_transactions(
    State(state): State<AppState>,
    request_id: Option<axum::Extension<RequestId>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let trace = trace_id(&request_id);

    let user_id = match parse_user_id(&params) {
        Ok(id) => id,
        Err(err) => return err.into_response_with_trace(&trace),
    };

    let page = match params.get("page").map(|s| s.parse::<i64>()) {
        None => 1,
        Some(Ok(page)) if page >= 1 => page,
        _ => return ApiError::InvalidParam("page").into_response_with_trace(&trace),
    };
    let page_size = match params.get("page_size").map(|s| s.parse::<i64>()) {
        None => 20,
        Some(Ok(page_size)) if page_size >= 1 => page_size,
        _ => return ApiError::InvalidParam("page_size").into_response_with_trace(&trace),
    };

    let result = LedgerStore::get_entries(&state.pool, user_id, page, page_size)
        .await
        .map_err(ApiError::from);

    match result {
        Ok((transactions, has_more)) => (
            StatusCode::OK,
            Json(Envelope::ok(TransactionHistoryResponse {
                has_more,
                transactions,
            })),
        )
            .into_response(),
        Err(err) => err.into_response_with_trace(&trace),
    }
}

/// `POST /api/v1/withdraw`.
pub async fn create_withdraw(
    State(state): State<AppState>,
    request_id: Option<axum::Extension<RequestId>>,
    Json(request): Json<CreateWithdrawRequest>,
) -> Response {
    let new_withdrawal = NewWithdrawal {
        wallet_id: request.user_id,
        bank: request.bank_type,
        iban: request.iban,
        amount: request.amount,
    };

    match state.withdrawal_service.create(new_withdrawal).await {
        Ok(withdrawal) => (StatusCode::CREATED, Json(Envelope::ok(withdrawal))).into_response(),
        Err(err) => ApiError::from(err).into_response_with_trace(&trace_id(&request_id)),
    }
}

/// `POST /api/v1/deposit`. `apply_at` defaults to now, matching the
/// original handler's `if request.ApplyAt == nil { now := time.Now() }`.
pub async fn create_deposit(
    State(state): State<AppState>,
    request_id: Option<axum::Extension<RequestId>>,
    Json(request): Json<CreateDepositRequest>,
) -> Response {
    let new_deposit = NewDeposit {
        user_id: request.user_id,
        amount: request.amount,
        apply_at: request.apply_at.unwrap_or_else(Utc::now),
        description: String::new(),
    };

    match state.deposit_service.create(new_deposit).await {
        Ok(deposit) => (StatusCode::CREATED, Json(Envelope::ok(deposit))).into_response(),
        Err(err) => ApiError::from(err).into_response_with_trace(&trace_id(&request_id)),
    }
}
