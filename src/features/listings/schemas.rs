use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::features::{
    images::reconcile::{CoverSelection, UploadKey},
    listings::models::{KitchenType, Listing, Parking, PropertyType},
    schemas::Pagination,
    users::schemas::OwnerOut,
};

// -- =====================
// -- IN
// -- =====================
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// The `listing_data` part of a create or reapply submission.
#[derive(Deserialize, Validate, Default, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingIn {
    pub address: String,
    pub city: String,
    pub area: Option<String>,
    pub pincode: String,
    pub map_link: Option<String>,
    pub parking: Parking,
    pub kitchen_type: KitchenType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub is_negotiable: bool,
    pub deposit: String,
    #[serde(alias = "type")]
    #[validate(length(min = 1, message = "Select at least one property type"))]
    pub property_types: Vec<PropertyType>,
    #[serde(alias = "price")]
    #[validate(custom(function = "not_blank", message = "Expected rent is required"))]
    pub expected_rent: String,
    pub description: String,
    #[validate(custom(function = "not_blank", message = "Contact phone is required"))]
    pub owner_phone: String,
    pub cover: Option<CoverSelection>,
    /// Reapplication only.
    pub removed_image_urls: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ListingQuery {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
}

impl ListingQuery {
    pub fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            offset: self.offset.unwrap_or(default.offset),
            limit: self.limit.unwrap_or(default.limit),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SetActiveIn {
    pub active: bool,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
pub struct ListingsResponse {
    pub listings: Vec<Listing>,
    pub total: usize,
}

#[derive(Serialize, Debug)]
pub struct ListingDetail {
    pub listing: Listing,
    pub owner: Option<OwnerOut>,
}

/// A listing as its owner sees it on the dashboard.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MyListingOut {
    #[serde(flatten)]
    pub listing: Listing,
    pub can_toggle_active: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: uuid::Uuid,
    pub message: String,
    pub image: String,
    pub images_count: usize,
    /// Files the image host refused; they are not part of the listing.
    pub failed_uploads: Vec<UploadKey>,
}
