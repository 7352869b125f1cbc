use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum ListingStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
    Occupied,
}

#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Parking {
    #[serde(rename = "1 Car + 1 Bike", alias = "car-bike")]
    CarAndBike,
    #[serde(rename = "2 Bikes + 1 Bicycle", alias = "2bikes-cycle")]
    TwoBikesAndBicycle,
    #[serde(rename = "Only Bike Parking", alias = "bike-only")]
    BikeOnly,
    #[serde(rename = "No Parking Available", alias = "none")]
    NoParking,
    #[default]
    #[serde(rename = "Other", alias = "other")]
    Other,
}

#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum KitchenType {
    Veg,
    NonVeg,
    #[default]
    Both,
}

/// Applicability tag of a listing.
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Students,
    Families,
    Girls,
    Boys,
    Couples,
    Commercial,
}

impl PropertyType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Students => "For Students",
            Self::Families => "For Families",
            Self::Girls => "Only for Girls",
            Self::Boys => "Only for Boys",
            Self::Couples => "Married Couples",
            Self::Commercial => "Commercial Property",
        }
    }
}

/// One rentable unit as persisted in the `properties` collection.
#[derive(Deserialize, Serialize, Clone, PartialEq, Default, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,

    // owner
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,

    // descriptive
    pub title: String,
    pub location: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,
    pub parking: Parking,
    pub kitchen_type: KitchenType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub is_negotiable: bool,
    pub deposit: String,
    #[serde(rename = "type")]
    pub types: Vec<PropertyType>,
    pub price: String,
    pub description: String,

    // moderation
    pub status: ListingStatus,
    pub is_user_active: bool,
    pub is_reapplication: bool,
    pub rejection_reason: Option<String>,

    // media
    pub image: String,
    pub images: Vec<String>,
    pub images_count: usize,

    // sponsorship, timestamps of uncertain shape
    pub is_sponsored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored_until: Option<Value>,

    pub created_at: String,
    pub updated_at: String,
}

/// Fields an owner-side write may touch. Absent fields are left as stored.
#[derive(Serialize, Clone, PartialEq, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub map_link: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<Parking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitchen_type: Option<KitchenType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_negotiable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<PropertyType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_user_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reapplication: Option<bool>,
    /// `Some(None)` writes an explicit null.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub rejection_reason: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ListingPatch {
    pub fn active(is_user_active: bool) -> Self {
        Self {
            is_user_active: Some(is_user_active),
            ..Default::default()
        }
    }
}
