pub mod features;
pub mod services;
pub mod utilities;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    features::{favorites, listings, session, sponsorship, users},
    utilities::app_state::AppState,
};

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

fn cors_layer(frontend_endpoint: &str) -> CorsLayer {
    let origin = match frontend_endpoint.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!(
                "FRONTEND_ENDPOINT {:?} is not a valid origin, allowing any",
                frontend_endpoint
            );
            AllowOrigin::from(Any)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_endpoint);
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .merge(listings::routes().layer(upload_limit))
        .merge(sponsorship::routes())
        .merge(favorites::routes())
        .merge(users::routes().layer(upload_limit))
        .merge(session::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
