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
use tradepost_parties::{Hunter, HunterPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            post(create_hunter)
                .get(list_hunters)
                .patch(update_hunter_by_name)
                .delete(delete_hunter_by_name),
        )
        .route(
            "/:id",
            get(get_hunter).patch(update_hunter).delete(delete_hunter),
        )
}

pub async fn create_hunter(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateHunterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    match services.hunters.find_by_name(&req.name) {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "conflict",
                format!("a hunter named '{}' already exists", req.name),
            );
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let hunter = match Hunter::new(
        PartyId::new(),
        req.name,
        req.location,
        req.race.unwrap_or_default(),
    ) {
        Ok(h) => h,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.hunters.upsert(hunter.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::hunter_to_json(&hunter))).into_response()
}

/// Without `?name=` this lists every hunter; with it, it is a single
/// record lookup.
pub async fn list_hunters(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameQuery>,
) -> axum::response::Response {
    match query.name {
        Some(name) => match services.hunters.find_by_name(&name) {
            Ok(Some(hunter)) => {
                (StatusCode::OK, Json(dto::hunter_to_json(&hunter))).into_response()
            }
            Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
            Err(e) => errors::store_error_to_response(e),
        },
        None => match services.hunters.find(&|_: &Hunter| true) {
            Ok(mut hunters) => {
                hunters.sort_by(|a, b| a.name().cmp(b.name()));
                let items = hunters.iter().map(dto::hunter_to_json).collect::<Vec<_>>();
                (StatusCode::OK, Json(items)).into_response()
            }
            Err(e) => errors::store_error_to_response(e),
        },
    }
}

pub async fn get_hunter(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.hunters.get(&id) {
        Ok(Some(hunter)) => (StatusCode::OK, Json(dto::hunter_to_json(&hunter))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_hunter(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<HunterPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.hunters.get(&id) {
        Ok(Some(hunter)) => apply_hunter_patch(&services, hunter, body),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_hunter_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameQuery>,
    body: Result<Json<HunterPatch>, JsonRejection>,
) -> axum::response::Response {
    let Some(name) = query.name else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_query",
            "the 'name' query parameter is required",
        );
    };
    match services.hunters.find_by_name(&name) {
        Ok(Some(hunter)) => apply_hunter_patch(&services, hunter, body),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn apply_hunter_patch(
    services: &AppServices,
    mut hunter: Hunter,
    body: Result<Json<HunterPatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    if let Some(new_name) = patch.name.as_deref() {
        match services.hunters.find_by_name(new_name.trim()) {
            Ok(Some(existing)) if existing.id() != hunter.id() => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "conflict",
                    format!("a hunter named '{new_name}' already exists"),
                );
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Err(e) = hunter.apply_patch(patch) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.hunters.upsert(hunter.clone()) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::hunter_to_json(&hunter))).into_response()
}

pub async fn delete_hunter(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartyId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.hunters.remove(&id) {
        Ok(Some(hunter)) => (StatusCode::OK, Json(dto::hunter_to_json(&hunter))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_hunter_by_name(
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

    let hunter = match services.hunters.find_by_name(&name) {
        Ok(Some(h)) => h,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "hunter not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.hunters.remove(&hunter.id()) {
        Ok(_) => (StatusCode::OK, Json(dto::hunter_to_json(&hunter))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
