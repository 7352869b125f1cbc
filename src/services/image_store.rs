use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::utilities::errors::AppError;

/// A local file headed for the image host.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads one file and returns its durable display URL.
    async fn upload(&self, file: &ImageUpload) -> Result<String, AppError>;
    /// Deletes a previously uploaded file by its display URL. URLs that do
    /// not point at the host are skipped.
    async fn delete(&self, display_url: &str) -> Result<(), AppError>;
}

/// The path segment following `/image/` in a display URL.
pub fn file_id_from_url(display_url: &str) -> Option<&str> {
    let (_, rest) = display_url.split_once("/image/")?;
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (!id.is_empty()).then_some(id)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    display_url: String,
}

#[derive(Clone)]
pub struct HttpImageStore {
    base_url: String,
    client: Client,
}

impl HttpImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, file: &ImageUpload) -> Result<String, AppError> {
        let kind = infer::get(&file.bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| {
                AppError::InvalidImageFormatError(format!(
                    "{} is not an image",
                    file.file_name.as_deref().unwrap_or("upload")
                ))
            })?;

        let file_name = file
            .file_name
            .clone()
            .unwrap_or_else(|| format!("image.{}", kind.extension()));

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file_name)
            .mime_str(kind.mime_type())?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteOperationError(format!(
                "Image upload failed with status {status}"
            )));
        }

        let body: UploadResponse = response.json().await?;
        debug!("Uploaded image to {}", body.display_url);

        Ok(body.display_url)
    }

    async fn delete(&self, display_url: &str) -> Result<(), AppError> {
        let Some(file_id) = file_id_from_url(display_url) else {
            debug!("Skipping delete of foreign image url {}", display_url);
            return Ok(());
        };

        let response = self
            .client
            .delete(format!("{}/image/{}", self.base_url, file_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteOperationError(format!(
                "Image delete failed with status {status}"
            )));
        }

        info!("Deleted image {}", file_id);
        Ok(())
    }
}
