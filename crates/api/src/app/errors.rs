use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradepost_core::DomainError;
use tradepost_infra::StoreError;
use tradepost_ledger::TxError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a transaction-processing failure to its HTTP response.
///
/// Insufficient stock and overflow surface as 500 (a reconciler failure,
/// not a caller mistake in this API's contract); a failed revert is the
/// caller-visible 400 of the update/delete flows.
pub fn tx_error_to_response(err: TxError) -> axum::response::Response {
    match err {
        TxError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
        TxError::PartyNotFound(name) => json_error(
            StatusCode::NOT_FOUND,
            "party_not_found",
            format!("no party named '{name}'"),
        ),
        TxError::GoodNotFound(name) => json_error(
            StatusCode::NOT_FOUND,
            "good_not_found",
            format!("no good named '{name}'"),
        ),
        TxError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "transaction not found"),
        TxError::InsufficientStock(name) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "insufficient_stock",
            format!("insufficient stock for good '{name}'"),
        ),
        TxError::StockOverflow(name) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "stock_overflow",
            format!("stock for good '{name}' would exceed the allowed maximum"),
        ),
        TxError::RevertFailed(msg) => json_error(StatusCode::BAD_REQUEST, "revert_failed", msg),
        TxError::Internal(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

/// Map a domain validation failure to its HTTP response.
///
/// Malformed identifiers map to 500: a bad id is a cast error, not a
/// missing resource.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid_id", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}
