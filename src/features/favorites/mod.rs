pub mod handlers;
pub mod repository;

use axum::{
    Router,
    routing::{get, post},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/favorites", get(handlers::get_favorites_handler))
        .route("/api/v1/favorites/{id}", post(handlers::toggle_like_handler))
}
