use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};

use crate::{
    features::users::{
        implementations::photo_from_multipart,
        repository::{ensure_profile, update_profile, upload_profile_photo},
        schemas::ProfileUpdateIn,
    },
    utilities::{
        app_state::{Images, Store},
        errors::AppError,
        jwt::{Session, require_principal},
    },
};

pub async fn get_profile_handler(
    session: Session,
    State(store): State<Store>,
) -> Result<impl IntoResponse, AppError> {
    let user = ensure_profile(store.as_ref(), session.principal()).await?;

    Ok(Json(user))
}

pub async fn update_profile_handler(
    session: Session,
    State(store): State<Store>,
    Json(update): Json<ProfileUpdateIn>,
) -> Result<impl IntoResponse, AppError> {
    ensure_profile(store.as_ref(), session.principal()).await?;
    let user = update_profile(store.as_ref(), session.principal(), update).await?;

    Ok(Json(user))
}

pub async fn upload_profile_photo_handler(
    session: Session,
    State(store): State<Store>,
    State(images): State<Images>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    require_principal(session.principal())?;

    let upload = photo_from_multipart(multipart).await?;
    ensure_profile(store.as_ref(), session.principal()).await?;
    let user =
        upload_profile_photo(store.as_ref(), images.as_ref(), session.principal(), upload).await?;

    Ok(Json(user))
}
