use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for any route outside the API surface.
pub async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
