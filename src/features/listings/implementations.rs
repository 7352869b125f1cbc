use std::collections::HashSet;

use axum::extract::Multipart;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    features::{
        images::reconcile::{PendingImage, UploadKey},
        listings::{
            models::{Listing, ListingStatus, PropertyType},
            schemas::{ListingIn, MyListingOut},
        },
    },
    services::image_store::ImageUpload,
    utilities::errors::AppError,
};

pub const DEFAULT_REJECTION_REASON: &str = "Criteria not met.";
pub const UNKNOWN_OWNER_NAME: &str = "Unknown User";

/// `"<labels joined by ', '> in <area>"`
pub fn compose_title(types: &[PropertyType], area: &str) -> String {
    let labels: Vec<&str> = types.iter().map(PropertyType::label).collect();
    format!("{} in {}", labels.join(", "), area)
}

pub fn compose_location(area: &str, city: &str) -> String {
    format!("{area}, {city}")
}

/// Area recovered from a stored `"<area>, <city>"` location.
pub fn area_from_location(location: &str) -> &str {
    location.split(',').next().unwrap_or_default().trim()
}

impl Listing {
    /// Shown in public browse and search results.
    pub fn is_publicly_visible(&self) -> bool {
        self.status == ListingStatus::Verified && self.is_user_active
    }

    pub fn matches_search(&self, q: &str) -> bool {
        let q = q.trim().to_lowercase();
        q.is_empty()
            || self.location.to_lowercase().contains(&q)
            || self.title.to_lowercase().contains(&q)
    }

    pub fn can_toggle_active(&self) -> bool {
        self.status == ListingStatus::Verified
    }
}

impl From<Listing> for MyListingOut {
    fn from(mut listing: Listing) -> Self {
        if listing.status == ListingStatus::Rejected && listing.rejection_reason.is_none() {
            listing.rejection_reason = Some(DEFAULT_REJECTION_REASON.to_string());
        }
        Self {
            can_toggle_active: listing.can_toggle_active(),
            listing,
        }
    }
}

impl ListingIn {
    /// Drops repeated property types, keeping first-seen order, then
    /// validates the form.
    pub fn check(&mut self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        self.property_types.retain(|kind| seen.insert(*kind));

        self.validate()
            .map_err(|errors| AppError::ValidationError(errors.to_string()))
    }

    /// The submitted map link; blank counts as none.
    pub fn map_link(&self) -> Option<String> {
        self.map_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(str::to_string)
    }
}

/// A parsed create or reapply submission.
#[derive(Debug)]
pub struct ListingForm {
    pub listing_in: ListingIn,
    pub images: Vec<PendingImage>,
}

impl ListingForm {
    /// Reads `listing_data` (JSON) and every `image:<category>` file part.
    /// Files are keyed by category and their position within it.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut listing_json: Option<String> = None;
        let mut images: Vec<PendingImage> = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            debug!(
                "name: {:?}, file_name: {:?}",
                field.name(),
                field.file_name()
            );
            let name = field.name().unwrap_or_default().to_string();

            if name == "listing_data" {
                listing_json = Some(field.text().await?);
            } else if let Some(category) = name.strip_prefix("image:") {
                let category = category.trim().to_string();
                if category.is_empty() {
                    return Err(AppError::InvalidFormData(
                        "Image field needs a category".into(),
                    ));
                }
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;

                let index = images
                    .iter()
                    .filter(|image| image.key.category == category)
                    .count();
                images.push(PendingImage {
                    key: UploadKey::new(category, index),
                    upload: ImageUpload { file_name, bytes },
                });
            } else {
                warn!("Unknown multipart field: {}", name);
            }
        }

        let listing_json = listing_json
            .ok_or_else(|| AppError::InvalidFormData("listing_data field is missing".into()))?;
        let listing_in: ListingIn = serde_json::from_str(&listing_json)?;

        Ok(Self { listing_in, images })
    }
}
