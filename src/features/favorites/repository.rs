use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    features::listings::models::Listing,
    services::store::DocumentStore,
    utilities::{
        errors::AppError,
        jwt::{Principal, require_principal},
    },
};

/// Flips membership of `listing_id` in the caller's liked set and returns
/// whether it is now liked. The store applies set union or difference, so
/// repeated calls never duplicate an id.
pub async fn toggle_like(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
    listing_id: Uuid,
) -> Result<bool, AppError> {
    let principal = require_principal(principal)?;

    let liked = store
        .get_user(&principal.uid)
        .await?
        .is_some_and(|user| user.liked.contains(&listing_id));

    if liked {
        store.remove_liked(&principal.uid, listing_id).await?;
    } else {
        store.add_liked(&principal.uid, listing_id).await?;
    }

    debug!("{} liked {}: {}", principal.uid, listing_id, !liked);
    Ok(!liked)
}

/// Fetches every liked listing individually and in parallel. Ids whose
/// listing is gone are dropped.
pub async fn resolve_favorites(store: &dyn DocumentStore, liked: &[Uuid]) -> Vec<Listing> {
    if liked.is_empty() {
        return Vec::new();
    }

    let results = join_all(liked.iter().map(|id| store.get_listing(*id))).await;

    liked
        .iter()
        .zip(results)
        .filter_map(|(id, result)| match result {
            Ok(Some(listing)) => Some(listing),
            Ok(None) => {
                debug!("Liked listing {} no longer exists", id);
                None
            }
            Err(e) => {
                warn!("Failed to load liked listing {}: {}", id, e);
                None
            }
        })
        .collect()
}

pub async fn get_favorites(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<Vec<Listing>, AppError> {
    let principal = require_principal(principal)?;

    let liked = store
        .get_user(&principal.uid)
        .await?
        .map(|user| user.liked)
        .unwrap_or_default();

    Ok(resolve_favorites(store, &liked).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::listings::models::ListingPatch,
        features::sponsorship::models::AdRequest,
        features::users::models::{User, UserPatch},
        services::store::{Callback, MemoryStore, Subscription},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn principal(uid: &str) -> Principal {
        Principal {
            uid: uid.to_string(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn toggle_requires_a_principal() {
        let store = MemoryStore::new();
        let result = toggle_like(&store, None, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::AuthRequiredError)));
    }

    #[tokio::test]
    async fn double_like_keeps_one_entry() {
        let store = MemoryStore::new();
        let user = principal("u1");
        let id = Uuid::new_v4();

        assert!(toggle_like(&store, Some(&user), id).await.unwrap());
        // A second writer that has not seen the first toggle yet.
        store.add_liked("u1", id).await.unwrap();
        let liked = store.get_user("u1").await.unwrap().unwrap().liked;
        assert_eq!(liked, vec![id]);

        assert!(!toggle_like(&store, Some(&user), id).await.unwrap());
        assert!(store.get_user("u1").await.unwrap().unwrap().liked.is_empty());
    }

    #[tokio::test]
    async fn deleted_listings_are_dropped() {
        let store = MemoryStore::new();
        let x = Listing {
            id: Uuid::new_v4(),
            title: "x".to_string(),
            ..Default::default()
        };
        let y = Listing {
            id: Uuid::new_v4(),
            title: "y".to_string(),
            ..Default::default()
        };
        store.insert_listing(&x).await.unwrap();
        store.insert_listing(&y).await.unwrap();
        store.add_liked("u1", x.id).await.unwrap();
        store.add_liked("u1", y.id).await.unwrap();
        store.delete_listing(y.id).await.unwrap();

        let favorites = get_favorites(&store, Some(&principal("u1"))).await.unwrap();
        assert_eq!(favorites, vec![x]);
    }

    /// Counts listing reads and delegates everything else.
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn init(&self) -> Result<(), AppError> {
            self.inner.init().await
        }
        async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError> {
            self.inner.insert_listing(listing).await
        }
        async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_listing(id).await
        }
        async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<(), AppError> {
            self.inner.update_listing(id, patch).await
        }
        async fn delete_listing(&self, id: Uuid) -> Result<bool, AppError> {
            self.inner.delete_listing(id).await
        }
        async fn listings_by_owner(&self, owner_id: &str) -> Result<Vec<Listing>, AppError> {
            self.inner.listings_by_owner(owner_id).await
        }
        async fn verified_listings(&self) -> Result<Vec<Listing>, AppError> {
            self.inner.verified_listings().await
        }
        async fn sponsored_listings(&self) -> Result<Vec<Listing>, AppError> {
            self.inner.sponsored_listings().await
        }
        async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
            self.inner.get_user(uid).await
        }
        async fn create_user(&self, user: &User) -> Result<(), AppError> {
            self.inner.create_user(user).await
        }
        async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<(), AppError> {
            self.inner.merge_user(uid, patch).await
        }
        async fn add_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
            self.inner.add_liked(uid, listing_id).await
        }
        async fn remove_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
            self.inner.remove_liked(uid, listing_id).await
        }
        async fn insert_ad_request(&self, request: &AdRequest) -> Result<(), AppError> {
            self.inner.insert_ad_request(request).await
        }
        async fn ad_requests_for_listing(
            &self,
            listing_id: Uuid,
        ) -> Result<Vec<AdRequest>, AppError> {
            self.inner.ad_requests_for_listing(listing_id).await
        }
        async fn subscribe_sponsored(
            &self,
            callback: Callback<Vec<Listing>>,
        ) -> Result<Subscription, AppError> {
            self.inner.subscribe_sponsored(callback).await
        }
        async fn subscribe_owner_listings(
            &self,
            owner_id: &str,
            callback: Callback<Vec<Listing>>,
        ) -> Result<Subscription, AppError> {
            self.inner.subscribe_owner_listings(owner_id, callback).await
        }
        async fn subscribe_user(
            &self,
            uid: &str,
            callback: Callback<Option<User>>,
        ) -> Result<Subscription, AppError> {
            self.inner.subscribe_user(uid, callback).await
        }
    }

    #[tokio::test]
    async fn empty_liked_set_makes_no_listing_reads() {
        let store = CountingStore {
            inner: MemoryStore::new(),
            reads: AtomicUsize::new(0),
        };
        store
            .create_user(&User {
                uid: "u1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let favorites = get_favorites(&store, Some(&principal("u1"))).await.unwrap();
        assert!(favorites.is_empty());
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }
}
