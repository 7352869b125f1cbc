use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PENDING_PROMOTION_MESSAGE: &str =
    "A promotion request for this property is already pending.";

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
pub enum AdRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// An owner's request to promote a listing. Approval happens outside this
/// service.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub property_title: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub status: AdRequestStatus,
    pub duration: u32,
    pub created_at: String,
}
