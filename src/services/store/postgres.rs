use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use sqlx::{postgres::PgListener, types::Json};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    features::{
        listings::models::{Listing, ListingPatch},
        sponsorship::models::{AdRequest, PENDING_PROMOTION_MESSAGE},
        users::models::{User, UserPatch},
    },
    services::{
        database::Database,
        store::{Callback, DocumentStore, StoreChange, Subscription, spawn_snapshots},
    },
    utilities::errors::AppError,
};

const CHANGES_CHANNEL: &str = "store_changes";

/// Document store on Postgres: JSONB documents plus a `favorites` table,
/// with change notifications delivered over LISTEN/NOTIFY.
#[derive(Clone)]
pub struct PgStore {
    database: Database,
    changes: broadcast::Sender<StoreChange>,
}

impl PgStore {
    pub fn new(database: Database) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self { database, changes }
    }

    fn spawn_listener(&self) {
        let pool = self.database.pool.clone();
        let changes = self.changes.clone();

        tokio::spawn(async move {
            loop {
                let mut listener = match PgListener::connect_with(&pool).await {
                    Ok(listener) => listener,
                    Err(e) => {
                        error!("Failed to open change listener: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                };
                if let Err(e) = listener.listen(CHANGES_CHANNEL).await {
                    error!("Failed to LISTEN on {}: {}", CHANGES_CHANNEL, e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }

                loop {
                    match listener.recv().await {
                        Ok(notification) => {
                            match serde_json::from_str::<StoreChange>(notification.payload()) {
                                Ok(change) => {
                                    let _ = changes.send(change);
                                }
                                Err(e) => warn!(
                                    "Ignoring malformed change payload {:?}: {}",
                                    notification.payload(),
                                    e
                                ),
                            }
                        }
                        Err(e) => {
                            warn!("Change listener dropped, reconnecting: {}", e);
                            break;
                        }
                    }
                }
            }
        });
    }

    async fn liked_ids(&self, uid: &str) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT listing_id FROM favorites WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(uid)
        .fetch_all(&self.database.pool)
        .await?;
        Ok(ids)
    }

    async fn ensure_user_row(&self, uid: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (uid, doc) VALUES ($1, $2) ON CONFLICT (uid) DO NOTHING")
            .bind(uid)
            .bind(Json(json!({ "uid": uid })))
            .execute(&self.database.pool)
            .await?;
        Ok(())
    }
}

/// The liked set lives in `favorites`, not in the user document.
fn user_document(user: &User) -> Result<Value, AppError> {
    let mut doc = serde_json::to_value(user)?;
    if let Some(fields) = doc.as_object_mut() {
        fields.remove("likedProperties");
    }
    Ok(doc)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn init(&self) -> Result<(), AppError> {
        self.database.migrate().await?;
        self.spawn_listener();
        Ok(())
    }

    async fn insert_listing(&self, listing: &Listing) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, owner_id, doc)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET owner_id = EXCLUDED.owner_id, doc = EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(listing.id)
        .bind(&listing.owner_id)
        .bind(Json(listing))
        .execute(&self.database.pool)
        .await?;
        Ok(())
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let doc = sqlx::query_scalar::<_, Json<Listing>>("SELECT doc FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.database.pool)
            .await?;
        Ok(doc.map(|Json(listing)| listing))
    }

    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE listings SET doc = doc || $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(patch))
        .execute(&self.database.pool)
        .await?;

        match result.rows_affected() {
            0 => Err(AppError::NotFoundError(format!("Listing {id} not found"))),
            _ => Ok(()),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.database.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn listings_by_owner(&self, owner_id: &str) -> Result<Vec<Listing>, AppError> {
        let docs = sqlx::query_scalar::<_, Json<Listing>>(
            "SELECT doc FROM listings WHERE owner_id = $1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.database.pool)
        .await?;
        Ok(docs.into_iter().map(|Json(listing)| listing).collect())
    }

    async fn verified_listings(&self) -> Result<Vec<Listing>, AppError> {
        let docs = sqlx::query_scalar::<_, Json<Listing>>(
            "SELECT doc FROM listings WHERE doc ->> 'status' = 'Verified' ORDER BY created_at",
        )
        .fetch_all(&self.database.pool)
        .await?;
        Ok(docs.into_iter().map(|Json(listing)| listing).collect())
    }

    async fn sponsored_listings(&self) -> Result<Vec<Listing>, AppError> {
        let docs = sqlx::query_scalar::<_, Json<Listing>>(
            r#"
            SELECT doc FROM listings
            WHERE doc ->> 'status' = 'Verified'
              AND doc -> 'isSponsored' = 'true'::jsonb
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.database.pool)
        .await?;
        Ok(docs.into_iter().map(|Json(listing)| listing).collect())
    }

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        let doc = sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.database.pool)
            .await?;

        let Some(Json(mut user)) = doc else {
            return Ok(None);
        };
        user.uid = uid.to_string();
        user.liked = self.liked_ids(uid).await?;
        Ok(Some(user))
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (uid, doc) VALUES ($1, $2) ON CONFLICT (uid) DO NOTHING")
            .bind(&user.uid)
            .bind(Json(user_document(user)?))
            .execute(&self.database.pool)
            .await?;

        for listing_id in &user.liked {
            self.add_liked(&user.uid, *listing_id).await?;
        }
        Ok(())
    }

    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<(), AppError> {
        let mut doc = serde_json::to_value(patch)?;
        if let Some(fields) = doc.as_object_mut() {
            fields.insert("uid".to_string(), Value::String(uid.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO users (uid, doc) VALUES ($1, $2)
            ON CONFLICT (uid) DO UPDATE SET doc = users.doc || EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(uid)
        .bind(Json(doc))
        .execute(&self.database.pool)
        .await?;
        Ok(())
    }

    async fn add_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
        self.ensure_user_row(uid).await?;
        sqlx::query(
            "INSERT INTO favorites (user_id, listing_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(uid)
        .bind(listing_id)
        .execute(&self.database.pool)
        .await?;
        Ok(())
    }

    async fn remove_liked(&self, uid: &str, listing_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND listing_id = $2")
            .bind(uid)
            .bind(listing_id)
            .execute(&self.database.pool)
            .await?;
        Ok(())
    }

    async fn insert_ad_request(&self, request: &AdRequest) -> Result<(), AppError> {
        sqlx::query("INSERT INTO ad_requests (id, property_id, doc) VALUES ($1, $2, $3)")
            .bind(request.id)
            .bind(request.property_id)
            .bind(Json(request))
            .execute(&self.database.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::PreconditionError(PENDING_PROMOTION_MESSAGE.to_string())
                }
                other => AppError::SqlxError(other),
            })?;
        Ok(())
    }

    async fn ad_requests_for_listing(&self, listing_id: Uuid) -> Result<Vec<AdRequest>, AppError> {
        let docs = sqlx::query_scalar::<_, Json<AdRequest>>(
            "SELECT doc FROM ad_requests WHERE property_id = $1 ORDER BY created_at",
        )
        .bind(listing_id)
        .fetch_all(&self.database.pool)
        .await?;
        Ok(docs.into_iter().map(|Json(request)| request).collect())
    }

    async fn subscribe_sponsored(
        &self,
        callback: Callback<Vec<Listing>>,
    ) -> Result<Subscription, AppError> {
        let store = self.clone();
        debug!("Subscribing to sponsored listings");
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
