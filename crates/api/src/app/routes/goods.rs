use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tradepost_core::{Entity, GoodId, Named};
use tradepost_goods::{Good, GoodPatch, Material};
use tradepost_infra::RecordStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_good).get(list_goods))
        .route("/:id", get(get_good).patch(update_good).delete(delete_good))
}

pub async fn create_good(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateGoodRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    match services.goods.find_by_name(&req.name) {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "conflict",
                format!("a good named '{}' already exists", req.name),
            );
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let good = match Good::new(
        GoodId::new(),
        req.name,
        req.description,
        req.material.unwrap_or_default(),
        req.weight,
        req.unit_value,
        req.stock.unwrap_or(0),
    ) {
        Ok(g) => g,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.goods.upsert(good.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::good_to_json(&good))).into_response()
}

pub async fn list_goods(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::GoodQuery>,
) -> axum::response::Response {
    let material = match query.material.as_deref() {
        None => None,
        Some(s) => match s.parse::<Material>() {
            Ok(m) => Some(m),
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.to_string());
            }
        },
    };

    let matching = services.goods.find(&|g: &Good| {
        query.name.as_deref().is_none_or(|n| g.name() == n)
            && query.description.as_deref().is_none_or(|d| g.description() == d)
            && material.is_none_or(|m| g.material() == m)
    });

    match matching {
        Ok(goods) if goods.is_empty() => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "no goods matched")
        }
        Ok(mut goods) => {
            goods.sort_by(|a, b| a.name().cmp(b.name()));
            let items = goods.iter().map(dto::good_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: GoodId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.goods.get(&id) {
        Ok(Some(good)) => (StatusCode::OK, Json(dto::good_to_json(&good))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "good not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<GoodPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: GoodId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    // An unknown body key lands here as a deserialization rejection.
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    let mut good = match services.goods.get(&id) {
        Ok(Some(g)) => g,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "good not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(new_name) = patch.name.as_deref() {
        match services.goods.find_by_name(new_name.trim()) {
            Ok(Some(existing)) if existing.id() != id => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "conflict",
                    format!("a good named '{new_name}' already exists"),
                );
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Err(e) = good.apply_patch(patch) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.goods.upsert(good.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::good_to_json(&good))).into_response()
}

pub async fn delete_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: GoodId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.goods.remove(&id) {
        Ok(Some(good)) => (StatusCode::OK, Json(dto::good_to_json(&good))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "good not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
