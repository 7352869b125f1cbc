use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::{
    features::{listings::models::Listing, sponsorship::validator::active_sponsorships},
    services::store::{DocumentStore, Subscription},
    utilities::errors::AppError,
};

/// The "Premium Collection": raw sponsored snapshots from the store,
/// filtered against the clock on every read.
#[derive(Clone)]
pub struct PremiumFeed {
    snapshots: watch::Receiver<Vec<Listing>>,
    _subscription: Arc<Subscription>,
}

impl PremiumFeed {
    pub async fn start(store: &dyn DocumentStore) -> Result<Self, AppError> {
        let (tx, rx) = watch::channel(Vec::new());
        let subscription = store
            .subscribe_sponsored(Arc::new(move |snapshot| {
                tx.send_replace(snapshot);
            }))
            .await?;

        Ok(Self {
            snapshots: rx,
            _subscription: Arc::new(subscription),
        })
    }

    pub fn current(&self) -> Vec<Listing> {
        active_sponsorships(&self.snapshots.borrow(), Utc::now())
    }

    /// Receiver that wakes on every pushed snapshot.
    pub fn changes(&self) -> watch::Receiver<Vec<Listing>> {
        self.snapshots.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::listings::models::ListingStatus, services::store::MemoryStore,
        utilities::timestamp::timestamp_value,
    };
    use chrono::Duration;
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;
    use uuid::Uuid;

    #[tokio::test]
    async fn rederives_on_every_push() {
        let store = MemoryStore::new();
        let feed = PremiumFeed::start(&store).await.unwrap();
        let mut changes = feed.changes();

        let listing = Listing {
            id: Uuid::new_v4(),
            status: ListingStatus::Verified,
            is_sponsored: true,
            sponsored_until: Some(timestamp_value(Utc::now() + Duration::days(2))),
            ..Default::default()
        };
        store.insert_listing(&listing).await.unwrap();

        timeout(StdDuration::from_secs(1), async {
            while changes.borrow_and_update().is_empty() {
                changes.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        assert_eq!(feed.current(), vec![listing.clone()]);

        store.delete_listing(listing.id).await.unwrap();
        timeout(StdDuration::from_secs(1), async {
            while !changes.borrow_and_update().is_empty() {
                changes.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        assert!(feed.current().is_empty());
    }
}
