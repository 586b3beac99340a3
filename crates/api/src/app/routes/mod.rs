use axum::Router;

pub mod goods;
pub mod hunters;
pub mod merchants;
pub mod system;
pub mod transactions;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/goods", goods::router())
        .nest("/hunters", hunters::router())
        .nest("/merchants", merchants::router())
        .nest("/transactions", transactions::router())
}
