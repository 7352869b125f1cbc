use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    features::favorites::repository::{get_favorites, toggle_like},
    utilities::{app_state::Store, errors::AppError, jwt::Session},
};

pub async fn toggle_like_handler(
    session: Session,
    State(store): State<Store>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let liked = toggle_like(store.as_ref(), session.principal(), listing_id).await?;

    let message = if liked {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    Ok(Json(json!({"liked": liked, "message": message})))
}

pub async fn get_favorites_handler(
    session: Session,
    State(store): State<Store>,
) -> Result<impl IntoResponse, AppError> {
    let favorites = get_favorites(store.as_ref(), session.principal()).await?;

    Ok(Json(favorites))
}
