pub mod feed;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod schemas;
pub mod validator;

use axum::{Router, routing::post};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/listings/{id}/promote",
        post(handlers::promote_listing_handler),
    )
}
