use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    features::{
        images::reconcile::{CoverSelection, ReconciledImages, UploadKey, reconcile, upload_all},
        listings::{
            implementations::{
                ListingForm, UNKNOWN_OWNER_NAME, area_from_location, compose_location,
                compose_title,
            },
            models::{Listing, ListingPatch, ListingStatus},
            schemas::{ListingDetail, ListingQuery, MyListingOut},
        },
        users::schemas::OwnerOut,
    },
    services::{image_store::ImageStore, store::DocumentStore},
    utilities::{
        config::Config,
        errors::AppError,
        jwt::{Principal, require_principal},
    },
};

/// Result of a create or reapply submission.
#[derive(Debug)]
pub struct Submission {
    pub id: Uuid,
    pub image: String,
    pub images_count: usize,
    pub failed_uploads: Vec<UploadKey>,
}

async fn owned_listing(
    store: &dyn DocumentStore,
    principal: &Principal,
    listing_id: Uuid,
) -> Result<Listing, AppError> {
    let listing = store
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Listing {listing_id} not found")))?;

    if listing.owner_id != principal.uid {
        return Err(AppError::ForbiddenError("listing".to_string()));
    }
    Ok(listing)
}

/// Deletes every URL, logging failures instead of returning them.
async fn release_images(images: &dyn ImageStore, listing_id: Uuid, urls: &[String]) {
    let results = join_all(urls.iter().map(|url| images.delete(url))).await;
    for (url, result) in urls.iter().zip(results) {
        if let Err(e) = result {
            warn!(
                "Listing {}: failed to delete image {}, leaving it orphaned: {}",
                listing_id, url, e
            );
        }
    }
}

pub async fn create_listing(
    store: &dyn DocumentStore,
    images: &dyn ImageStore,
    config: &Config,
    principal: Option<&Principal>,
    form: ListingForm,
) -> Result<Submission, AppError> {
    let principal = require_principal(principal)?;
    let ListingForm {
        mut listing_in,
        images: pending,
    } = form;
    listing_in.check()?;

    let outcome = upload_all(images, pending, config.upload_concurrency, |progress| {
        debug!(
            "upload {}/{} {}[{}] ok={}",
            progress.completed,
            progress.total,
            progress.key.category,
            progress.key.index,
            progress.succeeded
        );
    })
    .await;

    let ReconciledImages {
        image,
        images: image_urls,
        images_count,
    } = reconcile(
        &[],
        &outcome.uploaded,
        listing_in.cover.as_ref(),
        &config.placeholder_image_url,
    );

    let area = listing_in.area.clone().unwrap_or_default();
    let map_link = listing_in.map_link();
    let now = Utc::now().to_rfc3339();

    let listing = Listing {
        id: Uuid::new_v4(),
        owner_id: principal.uid.clone(),
        owner_name: principal
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_OWNER_NAME.to_string()),
        owner_email: principal.email.clone().unwrap_or_default(),
        owner_phone: listing_in.owner_phone,
        title: compose_title(&listing_in.property_types, &area),
        location: compose_location(&area, &listing_in.city),
        address: listing_in.address,
        city: listing_in.city,
        pincode: listing_in.pincode,
        map_link,
        parking: listing_in.parking,
        kitchen_type: listing_in.kitchen_type,
        bedrooms: listing_in.bedrooms,
        bathrooms: listing_in.bathrooms,
        is_negotiable: listing_in.is_negotiable,
        deposit: listing_in.deposit,
        types: listing_in.property_types,
        price: listing_in.expected_rent,
        description: listing_in.description,
        status: ListingStatus::Pending,
        is_user_active: true,
        is_reapplication: false,
        rejection_reason: None,
        image,
        images: image_urls,
        images_count,
        is_sponsored: false,
        sponsored_at: None,
        sponsored_until: None,
        created_at: now.clone(),
        updated_at: now,
    };

    store.insert_listing(&listing).await?;
    info!("Listing {} created by {}", listing.id, principal.uid);

    Ok(Submission {
        id: listing.id,
        image: listing.image,
        images_count: listing.images_count,
        failed_uploads: outcome.failed,
    })
}

/// Owner resubmission of a Rejected listing. Resets moderation to Pending
/// and clears the rejection reason. Image fields are only rewritten when files were
/// added or removed or the cover moved.
pub async fn reapply_listing(
    store: &dyn DocumentStore,
    images: &dyn ImageStore,
    config: &Config,
    principal: Option<&Principal>,
    listing_id: Uuid,
    form: ListingForm,
) -> Result<Submission, AppError> {
    let principal = require_principal(principal)?;
    let ListingForm {
        mut listing_in,
        images: pending,
    } = form;
    listing_in.check()?;

    let current = owned_listing(store, principal, listing_id).await?;
    if current.status != ListingStatus::Rejected {
        return Err(AppError::PreconditionError(
            "Only rejected properties can be re-applied.".to_string(),
        ));
    }

    let removed: Vec<String> = current
        .images
        .iter()
        .filter(|url| listing_in.removed_image_urls.contains(url))
        .cloned()
        .collect();
    let retained: Vec<String> = current
        .images
        .iter()
        .filter(|url| !removed.contains(url))
        .cloned()
        .collect();

    release_images(images, listing_id, &removed).await;

    let has_new_files = !pending.is_empty();
    let outcome = upload_all(images, pending, config.upload_concurrency, |progress| {
        debug!(
            "listing {}: upload {}/{} ok={}",
            listing_id, progress.completed, progress.total, progress.succeeded
        );
    })
    .await;

    let cover_moved = matches!(
        &listing_in.cover,
        Some(CoverSelection::Existing(url)) if *url != current.image
    ) || matches!(&listing_in.cover, Some(CoverSelection::Upload(_)));
    let images_changed = has_new_files || !removed.is_empty() || cover_moved;

    let area = listing_in
        .area
        .clone()
        .filter(|area| !area.trim().is_empty())
        .unwrap_or_else(|| area_from_location(&current.location).to_string());
    let map_link = listing_in.map_link();

    let mut patch = ListingPatch {
        owner_name: Some(
            principal
                .display_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_OWNER_NAME.to_string()),
        ),
        owner_email: principal.email.clone(),
        owner_phone: Some(listing_in.owner_phone),
        title: Some(compose_title(&listing_in.property_types, &area)),
        location: Some(compose_location(&area, &listing_in.city)),
        address: Some(listing_in.address),
        city: Some(listing_in.city),
        pincode: Some(listing_in.pincode),
        map_link: Some(map_link),
        parking: Some(listing_in.parking),
        kitchen_type: Some(listing_in.kitchen_type),
        bedrooms: Some(listing_in.bedrooms),
        bathrooms: Some(listing_in.bathrooms),
        is_negotiable: Some(listing_in.is_negotiable),
        deposit: Some(listing_in.deposit),
        types: Some(listing_in.property_types),
        price: Some(listing_in.expected_rent),
        description: Some(listing_in.description),
        status: Some(ListingStatus::Pending),
        is_user_active: Some(true),
        is_reapplication: Some(true),
        rejection_reason: Some(None),
        updated_at: Some(Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let (image, images_count) = if images_changed {
        let cover = listing_in
            .cover
            .unwrap_or_else(|| CoverSelection::Existing(current.image.clone()));
        let reconciled = reconcile(
            &retained,
            &outcome.uploaded,
            Some(&cover),
            &config.placeholder_image_url,
        );
        patch.image = Some(reconciled.image.clone());
        patch.images = Some(reconciled.images);
        patch.images_count = Some(reconciled.images_count);
        (reconciled.image, reconciled.images_count)
    } else {
        (current.image, current.images_count)
    };

    store.update_listing(listing_id, &patch).await?;
    info!("Listing {} reapplied by {}", listing_id, principal.uid);

    Ok(Submission {
        id: listing_id,
        image,
        images_count,
        failed_uploads: outcome.failed,
    })
}

/// Releases the listing's hosted images, then deletes the document. Image
/// failures never block the delete.
pub async fn delete_listing(
    store: &dyn DocumentStore,
    images: &dyn ImageStore,
    principal: Option<&Principal>,
    listing_id: Uuid,
) -> Result<(), AppError> {
    let principal = require_principal(principal)?;
    let listing = owned_listing(store, principal, listing_id).await?;

    release_images(images, listing_id, &listing.images).await;

    if !store.delete_listing(listing_id).await? {
        return Err(AppError::NotFoundError(format!(
            "Listing {listing_id} not found"
        )));
    }
    info!("Listing {} deleted by {}", listing_id, principal.uid);
    Ok(())
}

pub async fn set_active(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
    listing_id: Uuid,
    active: bool,
) -> Result<(), AppError> {
    let principal = require_principal(principal)?;
    let listing = owned_listing(store, principal, listing_id).await?;

    if listing.status != ListingStatus::Verified {
        return Err(AppError::PreconditionError(
            "Only approved properties can be activated.".to_string(),
        ));
    }

    store
        .update_listing(listing_id, &ListingPatch::active(active))
        .await
}

pub async fn get_my_listings(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<Vec<MyListingOut>, AppError> {
    let principal = require_principal(principal)?;
    let listings = store.listings_by_owner(&principal.uid).await?;
    Ok(listings.into_iter().map(MyListingOut::from).collect())
}

/// Public browse: Verified listings their owners have not paused.
pub async fn get_many_listings(
    store: &dyn DocumentStore,
    listing_query: &ListingQuery,
) -> Result<(Vec<Listing>, usize), AppError> {
    let pagination = listing_query.pagination();
    pagination.validate()?;

    let q = listing_query.q.as_deref().unwrap_or_default();
    let matching: Vec<Listing> = store
        .verified_listings()
        .await?
        .into_iter()
        .filter(Listing::is_publicly_visible)
        .filter(|listing| listing.matches_search(q))
        .filter(|listing| {
            listing_query
                .property_type
                .is_none_or(|wanted| listing.types.contains(&wanted))
        })
        .collect();

    let total = matching.len();
    Ok((pagination.page(matching), total))
}

/// One listing with its owner's contact details. Unapproved listings are
/// only visible to their owner.
pub async fn get_one_listing(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
    listing_id: Uuid,
) -> Result<ListingDetail, AppError> {
    let not_found = || AppError::NotFoundError(format!("Listing {listing_id} not found"));

    let listing = store.get_listing(listing_id).await?.ok_or_else(not_found)?;

    let is_owner = principal.is_some_and(|p| p.uid == listing.owner_id);
    if listing.status != ListingStatus::Verified && !is_owner {
        return Err(not_found());
    }

    let owner = store
        .get_user(&listing.owner_id)
        .await?
        .map(|user| OwnerOut::from(user).with_fallback_name(&listing.owner_name));
    Ok(ListingDetail { listing, owner })
}
