use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tradepost_core::TransactionId;
use tradepost_ledger::{NewTransaction, TxError};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            post(create_transaction)
                .get(list_transactions)
                .delete(delete_transactions),
        )
        .route(
            "/:id",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateTransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    let Some(kind) = req.kind else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", "'kind' is required");
    };
    let Some(party_name) = req.party_name else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            "'party_name' is required",
        );
    };
    let Some(line_items) = req.line_items else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            "'line_items' is required",
        );
    };

    match services.processor.create(NewTransaction {
        kind,
        party_name,
        line_items,
        date: req.date,
    }) {
        Ok(tx) => (StatusCode::CREATED, Json(dto::transaction_to_json(&tx))).into_response(),
        Err(e) => errors::tx_error_to_response(e),
    }
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TransactionQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", msg),
    };

    match services.processor.list(&filter) {
        Ok(matching) if matching.is_empty() => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "no transactions matched")
        }
        Ok(matching) => {
            let items = matching
                .iter()
                .map(dto::transaction_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::tx_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.processor.get(id) {
        Ok(tx) => (StatusCode::OK, Json(dto::transaction_to_json(&tx))).into_response(),
        Err(e) => errors::tx_error_to_response(e),
    }
}

pub async fn update_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateTransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    match services.processor.update(id, req.line_items, req.date) {
        Ok(tx) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": dto::transaction_to_json(&tx),
            })),
        )
            .into_response(),
        // A rewrite that names a good this ledger has never seen is a
        // caller mistake, not a missing resource.
        Err(TxError::GoodNotFound(name)) => errors::json_error(
            StatusCode::BAD_REQUEST,
            "bad_request",
            format!("no good named '{name}'"),
        ),
        Err(e) => errors::tx_error_to_response(e),
    }
}

pub async fn delete_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.processor.delete(id) {
        Ok(tx) => (StatusCode::OK, Json(dto::transaction_to_json(&tx))).into_response(),
        Err(e) => errors::tx_error_to_response(e),
    }
}

/// Bulk delete: every transaction matching the query filter is reversed
/// and removed.
pub async fn delete_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TransactionQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", msg),
    };

    match services.processor.delete_by_filter(&filter) {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "deleted": deleted })),
        )
            .into_response(),
        Err(TxError::NotFound) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "no transactions matched")
        }
        Err(e) => errors::tx_error_to_response(e),
    }
}
