use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tradepost_core::{Entity, Named, PartyId};
use tradepost_infra::RecordStore;
use tradepost_parties::{Merchant, MerchantPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            post(create_merchant)
                .get(list_merchants)
                .patch(update_merchant_by_name)
                .delete(delete_merchant_by_name),
        )
        .route(
            "/:id",
            get(get_merchant)
                .patch(update_merchant)
                .delete(delete_merchant),
        )
}

pub async fn create_merchant(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateMerchantRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    match services.merchants.find_by_name(&req.name) {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "conflict",
                format!("a merchant named '{}' already exists", req.name),
            );
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let merchant = match Merchant::new(
        PartyId::new(),
        req.name,
        req.location,
        req.kind.unwrap_or_default(),
    ) {
        Ok(m) => m,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.merchants.upsert(merchant.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::merchant_to_json(&merchant))).into_response()
}

pub async fn list_merchants(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameQuery>,
) -> axum::response::Response {
    match query.name {
        Some(name) => match services.merchants.find_by_name(&name) {
            Ok(Some(merchant)) => {
                (StatusCode::OK, Json(dto::merchant_to_json(&merchant))).into_response()
            }
            Ok(None) => {
                errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found")
            }
            Err(e) => errors::store_error_to_response(e),
        },
        None => match services.merchants.find(&|_: &Merchant| true) {
            Ok(mut merchants) => {
                merchants.sort_by(|a, b| a.name().cmp(b.name()));
                let items = merchants
                    .iter()
                    .map(dto::merchant_to_json)
                    .collect::<Vec<_>>();
                (StatusCode::OK, Json(items)).into_response()
            }
            Err(e) => errors::store_error_to_response(e),
        },
    }
}

pub async fn get_merchant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.merchants.get(&id) {
        Ok(Some(merchant)) => {
            (StatusCode::OK, Json(dto::merchant_to_json(&merchant))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_merchant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<MerchantPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.merchants.get(&id) {
        Ok(Some(merchant)) => apply_merchant_patch(&services, merchant, body),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_merchant_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameQuery>,
    body: Result<Json<MerchantPatch>, JsonRejection>,
) -> axum::response::Response {
    let Some(name) = query.name else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_query",
            "the 'name' query parameter is required",
        );
    };
    match services.merchants.find_by_name(&name) {
        Ok(Some(merchant)) => apply_merchant_patch(&services, merchant, body),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn apply_merchant_patch(
    services: &AppServices,
    mut merchant: Merchant,
    body: Result<Json<MerchantPatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    if let Some(new_name) = patch.name.as_deref() {
        match services.merchants.find_by_name(new_name.trim()) {
            Ok(Some(existing)) if existing.id() != merchant.id() => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "conflict",
                    format!("a merchant named '{new_name}' already exists"),
                );
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Err(e) = merchant.apply_patch(patch) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.merchants.upsert(merchant.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::merchant_to_json(&merchant))).into_response()
}

pub async fn delete_merchant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.merchants.remove(&id) {
        Ok(Some(merchant)) => {
            (StatusCode::OK, Json(dto::merchant_to_json(&merchant))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_merchant_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameQuery>,
) -> axum::response::Response {
    let Some(name) = query.name else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_query",
            "the 'name' query parameter is required",
        );
    };

    let merchant = match services.merchants.find_by_name(&name) {
        Ok(Some(m)) => m,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "merchant not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.merchants.remove(&merchant.id()) {
        Ok(_) => (StatusCode::OK, Json(dto::merchant_to_json(&merchant))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
