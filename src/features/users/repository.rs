use chrono::Utc;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    features::users::{
        models::{User, UserPatch, UserRole},
        schemas::ProfileUpdateIn,
    },
    services::{
        image_store::{ImageStore, ImageUpload},
        store::DocumentStore,
    },
    utilities::{
        errors::AppError,
        jwt::{Principal, require_principal},
    },
};

fn claimed(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads the caller's user document, creating it from identity claims on
/// first contact and re-syncing name and photo when the claims changed.
pub async fn ensure_profile(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<User, AppError> {
    let principal = require_principal(principal)?;

    let Some(user) = store.get_user(&principal.uid).await? else {
        let user = User {
            uid: principal.uid.clone(),
            email: principal.email.clone().unwrap_or_default(),
            full_name: principal.display_name.clone().unwrap_or_default(),
            photo_url: principal.photo_url.clone().unwrap_or_default(),
            role: UserRole::Tenant,
            phone_number: String::new(),
            created_at: Utc::now().to_rfc3339(),
            liked: Vec::new(),
        };
        store.create_user(&user).await?;
        info!("Created user document for {}", principal.uid);
        return Ok(store.get_user(&principal.uid).await?.unwrap_or(user));
    };

    let patch = UserPatch {
        full_name: claimed(principal.display_name.as_deref())
            .filter(|name| *name != user.full_name)
            .map(str::to_string),
        photo_url: claimed(principal.photo_url.as_deref())
            .filter(|photo| *photo != user.photo_url)
            .map(str::to_string),
        ..Default::default()
    };

    if patch.is_empty() {
        return Ok(user);
    }

    debug!("Syncing profile of {} from identity claims", principal.uid);
    store.merge_user(&principal.uid, &patch).await?;
    Ok(store.get_user(&principal.uid).await?.unwrap_or(user))
}

pub async fn update_profile(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
    update: ProfileUpdateIn,
) -> Result<User, AppError> {
    let principal = require_principal(principal)?;
    update.validate()?;

    let patch = UserPatch::from(update);
    if !patch.is_empty() {
        store.merge_user(&principal.uid, &patch).await?;
    }

    store
        .get_user(&principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))
}

/// Hosts a new profile photo and stores its URL on the user document.
pub async fn upload_profile_photo(
    store: &dyn DocumentStore,
    images: &dyn ImageStore,
    principal: Option<&Principal>,
    upload: ImageUpload,
) -> Result<User, AppError> {
    let principal = require_principal(principal)?;

    let photo_url = images.upload(&upload).await?;
    store
        .merge_user(
            &principal.uid,
            &UserPatch {
                photo_url: Some(photo_url),
                ..Default::default()
            },
        )
        .await?;

    store
        .get_user(&principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))
}
