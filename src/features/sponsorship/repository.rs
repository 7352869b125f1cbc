use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    features::{
        listings::{implementations::UNKNOWN_OWNER_NAME, models::ListingStatus},
        sponsorship::{
            models::{AdRequest, AdRequestStatus, PENDING_PROMOTION_MESSAGE},
            validator::is_active_sponsorship,
        },
    },
    services::store::DocumentStore,
    utilities::{
        errors::AppError,
        jwt::{Principal, require_principal},
    },
};

pub const MAX_PROMOTION_DAYS: u32 = 90;

/// Files a pending promotion request for an approved listing.
pub async fn request_promotion(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
    listing_id: Uuid,
    duration_days: u32,
    now: DateTime<Utc>,
) -> Result<AdRequest, AppError> {
    let principal = require_principal(principal)?;

    if !(1..=MAX_PROMOTION_DAYS).contains(&duration_days) {
        return Err(AppError::ValidationError(format!(
            "Promotion duration must be between 1 and {MAX_PROMOTION_DAYS} days"
        )));
    }

    let listing = store
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Listing {listing_id} not found")))?;

    if listing.owner_id != principal.uid {
        return Err(AppError::ForbiddenError("listing".to_string()));
    }

    if listing.status != ListingStatus::Verified {
        return Err(AppError::PreconditionError(
            "Only approved properties can be promoted.".to_string(),
        ));
    }

    if is_active_sponsorship(&listing, now) {
        return Err(AppError::PreconditionError(
            "This property is already sponsored.".to_string(),
        ));
    }

    let pending = store
        .ad_requests_for_listing(listing_id)
        .await?
        .into_iter()
        .any(|request| request.status == AdRequestStatus::Pending);
    if pending {
        return Err(AppError::PreconditionError(
            PENDING_PROMOTION_MESSAGE.to_string(),
        ));
    }

    let request = AdRequest {
        id: Uuid::new_v4(),
        property_id: listing.id,
        property_title: listing.title,
        owner_id: principal.uid.clone(),
        owner_name: principal
            .display_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_OWNER_NAME.to_string()),
        owner_email: principal.email.clone().unwrap_or_default(),
        status: AdRequestStatus::Pending,
        duration: duration_days,
        created_at: now.to_rfc3339(),
    };

    store.insert_ad_request(&request).await?;
    info!(
        "Promotion of listing {} for {} days requested",
        listing_id, duration_days
    );

    Ok(request)
}
