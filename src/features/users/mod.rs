pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;

use axum::{
    Router,
    routing::{get, post},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/profile",
            get(handlers::get_profile_handler).patch(handlers::update_profile_handler),
        )
        .route(
            "/api/v1/profile/photo",
            post(handlers::upload_profile_photo_handler),
        )
}
