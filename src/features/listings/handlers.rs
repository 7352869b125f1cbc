use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    features::{
        listings::{
            implementations::ListingForm,
            repository::{
                Submission, create_listing, delete_listing, get_many_listings, get_my_listings,
                get_one_listing, reapply_listing, set_active,
            },
            schemas::{ListingQuery, ListingsResponse, SetActiveIn, SubmissionResponse},
        },
        schemas::MessageResponse,
        sponsorship::feed::PremiumFeed,
    },
    utilities::{
        app_state::{Images, Store},
        config::Config,
        errors::AppError,
        jwt::{Session, require_principal},
    },
};

fn submission_response(submission: Submission, message: &str) -> SubmissionResponse {
    SubmissionResponse {
        id: submission.id,
        message: message.to_string(),
        image: submission.image,
        images_count: submission.images_count,
        failed_uploads: submission.failed_uploads,
    }
}

pub async fn get_many_listings_handler(
    State(store): State<Store>,
    Query(listing_query): Query<ListingQuery>,
) -> Result<impl IntoResponse, AppError> {
    debug!("listing query: {:?}", listing_query);

    let (listings, total) = get_many_listings(store.as_ref(), &listing_query).await?;

    Ok(Json(ListingsResponse { listings, total }))
}

pub async fn get_premium_listings_handler(
    State(premium): State<PremiumFeed>,
) -> Result<impl IntoResponse, AppError> {
    let listings = premium.current();
    let total = listings.len();
    Ok(Json(ListingsResponse { listings, total }))
}

pub async fn get_one_listing_handler(
    session: Session,
    State(store): State<Store>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let listing = get_one_listing(store.as_ref(), session.principal(), listing_id).await?;

    Ok(Json(listing))
}

pub async fn get_my_listings_handler(
    session: Session,
    State(store): State<Store>,
) -> Result<impl IntoResponse, AppError> {
    let listings = get_my_listings(store.as_ref(), session.principal()).await?;

    Ok(Json(listings))
}

pub async fn create_listing_handler(
    session: Session,
    State(store): State<Store>,
    State(images): State<Images>,
    State(config): State<Config>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // Sign-in is checked before the body is read.
    let principal = session.principal();
    require_principal(principal)?;

    let form = ListingForm::from_multipart(multipart).await?;
    let submission = create_listing(
        store.as_ref(),
        images.as_ref(),
        &config,
        principal,
        form,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(submission_response(
            submission,
            "Property listed successfully! Pending approval.",
        )),
    ))
}

pub async fn reapply_listing_handler(
    session: Session,
    State(store): State<Store>,
    State(images): State<Images>,
    State(config): State<Config>,
    Path(listing_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let principal = session.principal();
    require_principal(principal)?;

    let form = ListingForm::from_multipart(multipart).await?;
    let submission = reapply_listing(
        store.as_ref(),
        images.as_ref(),
        &config,
        principal,
        listing_id,
        form,
    )
    .await?;

    Ok(Json(submission_response(
        submission,
        "Re-application submitted successfully!",
    )))
}

pub async fn delete_listing_handler(
    session: Session,
    State(store): State<Store>,
    State(images): State<Images>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    delete_listing(
        store.as_ref(),
        images.as_ref(),
        session.principal(),
        listing_id,
    )
    .await?;

    Ok(Json(MessageResponse::new("Property deleted successfully.")))
}

pub async fn set_active_handler(
    session: Session,
    State(store): State<Store>,
    Path(listing_id): Path<Uuid>,
    Json(set_active_in): Json<SetActiveIn>,
) -> Result<impl IntoResponse, AppError> {
    set_active(
        store.as_ref(),
        session.principal(),
        listing_id,
        set_active_in.active,
    )
    .await?;

    let message = if set_active_in.active {
        "Property is now active."
    } else {
        "Property paused."
    };
    Ok(Json(MessageResponse::new(message)))
}
