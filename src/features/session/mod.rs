pub mod messages;
pub mod view;
pub mod websocket;

use axum::{Router, routing::get};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/ws", get(websocket::session_handler))
}
