use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Tenant,
    Owner,
    Admin,
    Employee,
}

/// User document keyed by the identity provider's uid.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    #[serde(alias = "displayName")]
    pub full_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub role: UserRole,
    pub phone_number: String,
    pub created_at: String,
    #[serde(rename = "likedProperties")]
    pub liked: Vec<Uuid>,
}

/// Merge applied to a user document. Absent fields are left as stored.
#[derive(Serialize, Clone, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
