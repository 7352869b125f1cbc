use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::users::models::{User, UserPatch};

// -- =====================
// -- IN
// -- =====================
/// Profile form. Email is never changed through this path.
#[derive(Deserialize, Validate, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateIn {
    #[serde(alias = "displayName")]
    #[validate(length(max = 100, message = "Name is too long"))]
    pub full_name: Option<String>,
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
    #[serde(rename = "photoURL")]
    #[validate(url(message = "Photo must be a valid URL"))]
    pub photo_url: Option<String>,
}

impl From<ProfileUpdateIn> for UserPatch {
    fn from(update: ProfileUpdateIn) -> Self {
        Self {
            full_name: update.full_name,
            photo_url: update.photo_url,
            phone_number: update.phone_number,
        }
    }
}

// -- =====================
// -- OUT
// -- =====================
/// Contact details shown next to a listing.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OwnerOut {
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

impl From<User> for OwnerOut {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            full_name: user.full_name,
            email: user.email,
            phone_number: user.phone_number,
            photo_url: user.photo_url,
        }
    }
}
