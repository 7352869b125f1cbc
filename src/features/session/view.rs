use uuid::Uuid;

use crate::{
    features::{
        listings::models::Listing,
        session::messages::{ClientMessage, ServerMessage},
        users::models::User,
    },
    utilities::layered::Layered,
};

/// Per-connection view of the caller's liked set and own listings.
#[derive(Default, Debug)]
pub struct SessionView {
    liked: Layered<Vec<Uuid>>,
    my_listings: Layered<Vec<Listing>>,
}

impl SessionView {
    pub fn liked(&self) -> &[Uuid] {
        self.liked.current()
    }

    pub fn my_listings(&self) -> &[Listing] {
        self.my_listings.current()
    }

    pub fn on_user(&mut self, user: Option<User>) -> ServerMessage {
        self.liked
            .apply_authoritative(user.map(|u| u.liked).unwrap_or_default());
        self.favorites_message()
    }

    pub fn on_owner_listings(&mut self, listings: Vec<Listing>) -> ServerMessage {
        self.my_listings.apply_authoritative(listings);
        self.my_listings_message()
    }

    /// Applies the local half of a client action. Returns the view to push
    /// before the remote write, or `None` when nothing visible changes.
    pub fn apply(&mut self, action: &ClientMessage) -> Option<ServerMessage> {
        match *action {
            ClientMessage::ToggleLike { listing_id } => {
                self.liked.update_provisional(|liked| {
                    if let Some(pos) = liked.iter().position(|id| *id == listing_id) {
                        liked.remove(pos);
                    } else {
                        liked.push(listing_id);
                    }
                });
                Some(self.favorites_message())
            }
            ClientMessage::SetActive { listing_id, active } => {
                let toggleable = self
                    .my_listings
                    .current()
                    .iter()
                    .any(|l| l.id == listing_id && l.can_toggle_active());
                if !toggleable {
                    return None;
                }
                self.my_listings.update_provisional(|listings| {
                    for listing in listings.iter_mut().filter(|l| l.id == listing_id) {
                        listing.is_user_active = active;
                    }
                });
                Some(self.my_listings_message())
            }
            ClientMessage::DeleteListing { listing_id } => {
                self.my_listings
                    .update_provisional(|listings| listings.retain(|l| l.id != listing_id));
                Some(self.my_listings_message())
            }
        }
    }

    fn favorites_message(&self) -> ServerMessage {
        ServerMessage::Favorites {
            liked: self.liked.current().clone(),
            provisional: self.liked.is_provisional(),
        }
    }

    fn my_listings_message(&self) -> ServerMessage {
        ServerMessage::MyListings {
            listings: self
                .my_listings
                .current()
                .iter()
                .cloned()
                .map(Into::into)
                .collect(),
            provisional: self.my_listings.is_provisional(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::listings::models::ListingStatus;

    fn listing(status: ListingStatus) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            owner_id: "owner".to_string(),
            status,
            is_user_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn toggle_like_flips_locally_until_store_answers() {
        let mut view = SessionView::default();
        let kept = Uuid::new_v4();
        let liked = Uuid::new_v4();
        view.on_user(Some(User {
            liked: vec![kept],
            ..Default::default()
        }));

        let pushed = view.apply(&ClientMessage::ToggleLike { listing_id: liked });
        assert!(matches!(
            pushed,
            Some(ServerMessage::Favorites { provisional: true, .. })
        ));
        assert_eq!(view.liked(), &[kept, liked]);

        view.apply(&ClientMessage::ToggleLike { listing_id: kept });
        assert_eq!(view.liked(), &[liked]);
    }

    #[test]
    fn failed_write_keeps_overlay_until_next_push() {
        let mut view = SessionView::default();
        let id = Uuid::new_v4();
        view.on_user(Some(User::default()));
        view.apply(&ClientMessage::ToggleLike { listing_id: id });

        // No rollback: the overlay stays after the write fails.
        assert_eq!(view.liked(), &[id]);

        let pushed = view.on_user(Some(User::default()));
        assert!(view.liked().is_empty());
        assert!(matches!(
            pushed,
            ServerMessage::Favorites { provisional: false, .. }
        ));
    }

    #[test]
    fn delete_hides_listing_at_once() {
        let mut view = SessionView::default();
        let gone = listing(ListingStatus::Pending);
        let stays = listing(ListingStatus::Verified);
        view.on_owner_listings(vec![gone.clone(), stays.clone()]);

        view.apply(&ClientMessage::DeleteListing { listing_id: gone.id });
        let ids: Vec<Uuid> = view.my_listings().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![stays.id]);
    }

    #[test]
    fn set_active_only_previews_verified_listings() {
        let mut view = SessionView::default();
        let pending = listing(ListingStatus::Pending);
        let verified = listing(ListingStatus::Verified);
        view.on_owner_listings(vec![pending.clone(), verified.clone()]);

        let refused = view.apply(&ClientMessage::SetActive {
            listing_id: pending.id,
            active: false,
        });
        assert!(refused.is_none());

        view.apply(&ClientMessage::SetActive {
            listing_id: verified.id,
            active: false,
        });
        let paused = view
            .my_listings()
            .iter()
            .find(|l| l.id == verified.id)
            .unwrap();
        assert!(!paused.is_user_active);
    }

    #[test]
    fn missing_user_document_means_empty_liked_set() {
        let mut view = SessionView::default();
        view.on_user(None);
        assert!(view.liked().is_empty());
    }
}
