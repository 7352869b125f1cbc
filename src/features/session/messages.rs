use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::listings::{models::Listing, schemas::MyListingOut};

/// Frames pushed to the client. `provisional` marks views that still carry
/// a local change the store has not confirmed.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Favorites {
        liked: Vec<Uuid>,
        provisional: bool,
    },
    #[serde(rename_all = "camelCase")]
    MyListings {
        listings: Vec<MyListingOut>,
        provisional: bool,
    },
    Premium {
        listings: Vec<Listing>,
    },
    Error {
        message: String,
    },
    SignInRequired {
        action: String,
    },
}

#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    ToggleLike { listing_id: Uuid },
    #[serde(rename_all = "camelCase")]
    SetActive { listing_id: Uuid, active: bool },
    #[serde(rename_all = "camelCase")]
    DeleteListing { listing_id: Uuid },
}

impl ClientMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::ToggleLike { .. } => "toggleLike",
            Self::SetActive { .. } => "setActive",
            Self::DeleteListing { .. } => "deleteListing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_frames_use_camel_case_tags() {
        let id = Uuid::new_v4();
        let parsed: ClientMessage = serde_json::from_value(json!({
            "type": "setActive",
            "listingId": id,
            "active": false,
        }))
        .unwrap();

        assert_eq!(
            parsed,
            ClientMessage::SetActive {
                listing_id: id,
                active: false
            }
        );
        assert_eq!(parsed.action(), "setActive");
    }

    #[test]
    fn unknown_client_frame_is_rejected() {
        let parsed = serde_json::from_value::<ClientMessage>(json!({"type": "approve"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn sign_in_frame_shape() {
        let frame = serde_json::to_value(ServerMessage::SignInRequired {
            action: "toggleLike".to_string(),
        })
        .unwrap();
        assert_eq!(frame, json!({"type": "signInRequired", "action": "toggleLike"}));
    }
}
