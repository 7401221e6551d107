use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as AxumResponse};
use axum::Json;
use thiserror::Error;
use wallet_core::CoreError;

use crate::payloads::Response;

/// Maps `wallet-core` domain errors (and a handful of request-validation
/// failures) onto the HTTP envelope, attaching a trace id to every 500 so a
/// caller can quote it back to support (spec §6, mirroring
/// `payloads.CreateCallSupportResponse`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("required parameter missing: {0}")]
    MissingParam(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),

    #[error(transparent)]
    Core {
        #[from]
        source: CoreError,
    },
}

impl ApiError {
    /// Renders this error with a trace id already resolved by the caller
    /// (the request-id middleware), so 500s are traceable without forcing
    /// every handler to thread the id through `CoreError` itself.
    pub fn into_response_with_trace(self, trace_id: &str) -> AxumResponse {
        match self {
            ApiError::MissingParam(param) => (
                StatusCode::BAD_REQUEST,
                Json(Response::<()>::err(
                    format!("no_{param}_provided"),
                    format!("parameter {param} is not provided"),
                )),
            )
                .into_response(),
            ApiError::InvalidParam(param) => (
                StatusCode::BAD_REQUEST,
                Json(Response::<()>::err(
                    format!("invalid_{param}"),
                    format!("parameter {param} is invalid"),
                )),
            )
                .into_response(),
            ApiError::Core {
                source: CoreError::InsufficientBalance,
            } => (
                StatusCode::BAD_REQUEST,
                Json(Response::<()>::err(
                    "insufficient_balance",
                    "there is not enough available balance to create withdraw",
                )),
            )
                .into_response(),
            ApiError::Core {
                source: CoreError::InvalidAmount,
            } => (
                StatusCode::BAD_REQUEST,
                Json(Response::<()>::err("invalid_amount", "amount must be positive")),
            )
                .into_response(),
            ApiError::Core { source } => {
                tracing::error!(error = %source, trace_id, "unexpected error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Response::<()>::err(
                        "unexpected_error",
                        format!("call support, trace id: '{trace_id}'"),
                    )),
                )
                    .into_response()
            }
        }
    }
}
