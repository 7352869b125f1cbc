use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    features::sponsorship::{repository::request_promotion, schemas::PromoteIn},
    utilities::{app_state::Store, errors::AppError, jwt::Session},
};

pub async fn promote_listing_handler(
    session: Session,
    State(store): State<Store>,
    Path(listing_id): Path<Uuid>,
    Json(promote_in): Json<PromoteIn>,
) -> Result<impl IntoResponse, AppError> {
    let request = request_promotion(
        store.as_ref(),
        session.principal(),
        listing_id,
        promote_in.duration_days,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}
