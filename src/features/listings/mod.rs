pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/listings",
            get(handlers::get_many_listings_handler).post(handlers::create_listing_handler),
        )
        .route(
            "/api/v1/listings/premium",
            get(handlers::get_premium_listings_handler),
        )
        .route(
            "/api/v1/listings/{id}",
            get(handlers::get_one_listing_handler)
                .put(handlers::reapply_listing_handler)
                .delete(handlers::delete_listing_handler),
        )
        .route(
            "/api/v1/listings/{id}/active",
            patch(handlers::set_active_handler),
        )
        .route("/api/v1/my/listings", get(handlers::get_my_listings_handler))
}
