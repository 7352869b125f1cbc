pub mod memory;
pub mod postgres;

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    features::{
        listings::models::{Listing, ListingPatch},
        sponsorship::models::AdRequest,
        users::models::{User, UserPatch},
    },
    utilities::errors::AppError,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Change notification emitted by a store after every committed write.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StoreChange {
    #[serde(rename_all = "camelCase")]
    Listing { id: Uuid, owner_id: String },
    User { uid: String },
    #[serde(rename_all = "camelCase")]
    AdRequest { property_id: Uuid },
}

/// Handle to a live subscription. Delivery stops on `unsubscribe` or drop.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn init(&self) -> Result<(), AppError>;

    // -- listings
    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError>;
    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError>;
    /// Writes only the fields the patch carries.
    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<(), AppError>;
    async fn delete_listing(&self, id: Uuid) -> Result<bool, AppError>;
    async fn listings_by_owner(&self, owner_id: &str) -> Result<Vec<Listing>, AppError>;
    async fn verified_listings(&self) -> Result<Vec<Listing>, AppError>;
    /// Listings flagged sponsored and Verified. Window checks are left to
    /// the caller.
    async fn sponsored_listings(&self) -> Result<Vec<Listing>, AppError>;

    // -- users
    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError>;
    /// Creates the document unless one already exists.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;
    /// Merges the patch into the document, creating it when missing.
    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<(), AppError>;
    /// Set union on the liked set.
    async fn add_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError>;
    /// Set difference on the liked set.
    async fn remove_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError>;

    // -- ad requests
    /// Fails with a precondition error when a pending request already exists
    /// for the same listing. The check and the insert are atomic.
    async fn insert_ad_request(&self, request: &AdRequest) -> Result<(), AppError>;
    async fn ad_requests_for_listing(&self, listing_id: Uuid) -> Result<Vec<AdRequest>, AppError>;

    // -- subscriptions
    async fn subscribe_sponsored(
        &self,
        callback: Callback<Vec<Listing>>,
    ) -> Result<Subscription, AppError>;
    async fn subscribe_owner_listings(
        &self,
        owner_id: &str,
        callback: Callback<Vec<Listing>>,
    ) -> Result<Subscription, AppError>;
    async fn subscribe_user(
        &self,
        uid: &str,
        callback: Callback<Option<User>>,
    ) -> Result<Subscription, AppError>;
}

/// Push a fresh snapshot to `callback` now and after every relevant change.
pub(crate) fn spawn_snapshots<T, R, F, Fut>(
    mut changes: broadcast::Receiver<StoreChange>,
    relevant: R,
    fetch: F,
    callback: Callback<T>,
) -> Subscription
where
    T: Send + 'static,
    R: Fn(&StoreChange) -> bool + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send,
{
    let handle = tokio::spawn(async move {
        loop {
            match fetch().await {
                Ok(snapshot) => callback(snapshot),
                Err(e) => warn!("Failed to fetch subscription snapshot: {}", e),
            }

            loop {
                match changes.recv().await {
                    Ok(change) if relevant(&change) => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Subscription lagged by {} changes, refetching", skipped);
                        break;
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        }
    });

    Subscription { handle }
}

/// Shallow merge of a serialized patch into a serialized document.
pub(crate) fn merge_document<T, P>(doc: &T, patch: &P) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    P: Serialize,
{
    let mut doc = serde_json::to_value(doc)?;
    let patch = serde_json::to_value(patch)?;

    if let (Value::Object(target), Value::Object(fields)) = (&mut doc, patch) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }

    Ok(serde_json::from_value(doc)?)
}
