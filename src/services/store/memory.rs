use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::{
    features::{
        listings::models::{Listing, ListingPatch, ListingStatus},
        sponsorship::models::{AdRequest, AdRequestStatus, PENDING_PROMOTION_MESSAGE},
        users::models::{User, UserPatch},
    },
    services::store::{
        Callback, DocumentStore, StoreChange, Subscription, merge_document, spawn_snapshots,
    },
    utilities::errors::AppError,
};

#[derive(Default)]
struct Collections {
    listings: Vec<Listing>,
    users: HashMap<String, User>,
    ad_requests: Vec<AdRequest>,
}

/// Process-local document store for development and tests.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            changes,
        }
    }

    fn notify(&self, change: StoreChange) {
        // No receivers just means nobody is subscribed.
        let _ = self.changes.send(change);
    }

    fn listing_changed(&self, listing: &Listing) {
        self.notify(StoreChange::Listing {
            id: listing.id,
            owner_id: listing.owner_id.clone(),
        });
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn init(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            inner.listings.retain(|l| l.id != listing.id);
            inner.listings.push(listing.clone());
        }
        self.listing_changed(listing);
        Ok(())
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<(), AppError> {
        let updated = {
            let mut inner = self.inner.write().await;
            let slot = inner
                .listings
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or_else(|| AppError::NotFoundError(format!("Listing {id} not found")))?;
            *slot = merge_document(&*slot, patch)?;
            slot.clone()
        };
        self.listing_changed(&updated);
        Ok(())
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, AppError> {
        let removed = {
            let mut inner = self.inner.write().await;
            let position = inner.listings.iter().position(|l| l.id == id);
            position.map(|index| inner.listings.remove(index))
        };
        match removed {
            Some(listing) => {
                self.listing_changed(&listing);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn listings_by_owner(&self, owner_id: &str) -> Result<Vec<Listing>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn verified_listings(&self) -> Result<Vec<Listing>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .iter()
            .filter(|l| l.status == ListingStatus::Verified)
            .cloned()
            .collect())
    }

    async fn sponsored_listings(&self) -> Result<Vec<Listing>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .iter()
            .filter(|l| l.is_sponsored && l.status == ListingStatus::Verified)
            .cloned()
            .collect())
    }

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(uid).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let created = {
            let mut inner = self.inner.write().await;
            if inner.users.contains_key(&user.uid) {
                false
            } else {
                inner.users.insert(user.uid.clone(), user.clone());
                true
            }
        };
        if created {
            self.notify(StoreChange::User {
                uid: user.uid.clone(),
            });
        }
        Ok(())
    }

    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            let current = inner.users.get(uid).cloned().unwrap_or_else(|| User {
                uid: uid.to_string(),
                ..Default::default()
            });
            let merged = merge_document(&current, patch)?;
            inner.users.insert(uid.to_string(), merged);
        }
        self.notify(StoreChange::User {
            uid: uid.to_string(),
        });
        Ok(())
    }

    async fn add_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            let user = inner.users.entry(uid.to_string()).or_insert_with(|| User {
                uid: uid.to_string(),
                ..Default::default()
            });
            if !user.liked.contains(&listing_id) {
                user.liked.push(listing_id);
            }
        }
        self.notify(StoreChange::User {
            uid: uid.to_string(),
        });
        Ok(())
    }

    async fn remove_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            if let Some(user) = inner.users.get_mut(uid) {
                user.liked.retain(|id| *id != listing_id);
            }
        }
        self.notify(StoreChange::User {
            uid: uid.to_string(),
        });
        Ok(())
    }

    async fn insert_ad_request(&self, request: &AdRequest) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            let pending = request.status == AdRequestStatus::Pending
                && inner.ad_requests.iter().any(|existing| {
                    existing.property_id == request.property_id
                        && existing.status == AdRequestStatus::Pending
                });
            if pending {
                return Err(AppError::PreconditionError(
                    PENDING_PROMOTION_MESSAGE.to_string(),
                ));
            }
            inner.ad_requests.push(request.clone());
        }
        self.notify(StoreChange::AdRequest {
            property_id: request.property_id,
        });
        Ok(())
    }

    async fn ad_requests_for_listing(&self, listing_id: Uuid) -> Result<Vec<AdRequest>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .ad_requests
            .iter()
            .filter(|r| r.property_id == listing_id)
            .cloned()
            .collect())
    }

    async fn subscribe_sponsored(
        &self,
        callback: Callback<Vec<Listing>>,
    ) -> Result<Subscription, AppError> {
        let store = self.clone();
        Ok(spawn_snapshots(
            self.changes.subscribe(),
            |change| matches!(change, StoreChange::Listing { .. }),
            move || {
                let store = store.clone();
                async move { store.sponsored_listings().await }
            },
            callback,
        ))
    }

    async fn subscribe_owner_listings(
        &self,
        owner_id: &str,
        callback: Callback<Vec<Listing>>,
    ) -> Result<Subscription, AppError> {
        let store = self.clone();
        let owner = owner_id.to_string();
        let watched = owner.clone();
        Ok(spawn_snapshots(
            self.changes.subscribe(),
            move |change| {
                matches!(change, StoreChange::Listing { owner_id, .. } if *owner_id == watched)
            },
            move || {
                let store = store.clone();
                let owner = owner.clone();
                async move { store.listings_by_owner(&owner).await }
            },
            callback,
        ))
    }

    async fn subscribe_user(
        &self,
        uid: &str,
        callback: Callback<Option<User>>,
    ) -> Result<Subscription, AppError> {
        let store = self.clone();
        let uid = uid.to_string();
        let watched = uid.clone();
        Ok(spawn_snapshots(
            self.changes.subscribe(),
            move |change| matches!(change, StoreChange::User { uid } if *uid == watched),
            move || {
                let store = store.clone();
                let uid = uid.clone();
                async move { store.get_user(&uid).await }
            },
            callback,
        ))
    }
}
