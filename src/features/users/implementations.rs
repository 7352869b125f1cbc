use axum::extract::Multipart;
use tracing::{debug, warn};

use crate::{
    features::users::schemas::OwnerOut,
    services::image_store::ImageUpload,
    utilities::errors::AppError,
};

impl OwnerOut {
    /// Public contact card, falling back to the listing's stored owner name
    /// when the profile carries none.
    pub fn with_fallback_name(mut self, owner_name: &str) -> Self {
        if self.full_name.trim().is_empty() {
            self.full_name = owner_name.to_string();
        }
        self
    }
}

/// Reads the single `image` field of a profile photo form.
pub async fn photo_from_multipart(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "image" {
            warn!("Unknown multipart field: {}", name);
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        debug!("profile photo {:?}: {} bytes", file_name, bytes.len());

        return Ok(ImageUpload { file_name, bytes });
    }

    Err(AppError::InvalidFormData("image field is missing".into()))
}
