use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::image_store::{ImageStore, ImageUpload};

/// Identifies a not-yet-uploaded file by its uploader-chosen category and
/// its position within that category.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct UploadKey {
    pub category: String,
    pub index: usize,
}

impl UploadKey {
    pub fn new(category: impl Into<String>, index: usize) -> Self {
        Self {
            category: category.into(),
            index,
        }
    }
}

/// Cover intent: a URL already on the listing or one of the new files.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum CoverSelection {
    Existing(String),
    Upload(UploadKey),
}

#[derive(Clone, Debug)]
pub struct PendingImage {
    pub key: UploadKey,
    pub upload: ImageUpload,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct UploadedImage {
    pub key: UploadKey,
    pub url: String,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub key: UploadKey,
    pub completed: usize,
    pub total: usize,
    pub succeeded: bool,
}

#[derive(Serialize, Clone, PartialEq, Eq, Default, Debug)]
pub struct UploadOutcome {
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<UploadKey>,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledImages {
    pub image: String,
    pub images: Vec<String>,
    pub images_count: usize,
}

/// Uploads every pending file with at most `concurrency` requests in flight.
/// Results keep encounter order. A failed file is reported through
/// `on_progress` and left out of `uploaded`.
pub async fn upload_all<P>(
    store: &dyn ImageStore,
    pending: Vec<PendingImage>,
    concurrency: usize,
    on_progress: P,
) -> UploadOutcome
where
    P: Fn(&UploadProgress),
{
    let total = pending.len();
    let mut outcome = UploadOutcome::default();

    let mut results = stream::iter(pending)
        .map(|image| async move {
            let result = store.upload(&image.upload).await;
            (image.key, result)
        })
        .buffered(concurrency.max(1));

    let mut completed = 0;
    while let Some((key, result)) = results.next().await {
        completed += 1;
        let succeeded = result.is_ok();
        on_progress(&UploadProgress {
            key: key.clone(),
            completed,
            total,
            succeeded,
        });

        match result {
            Ok(url) => outcome.uploaded.push(UploadedImage { key, url }),
            Err(e) => {
                warn!(
                    "Upload of {}[{}] failed, leaving it out: {}",
                    key.category, key.index, e
                );
                outcome.failed.push(key);
            }
        }
    }

    outcome
}

/// Final image list and cover for a listing.
///
/// `images` is `existing ++ uploaded`. The cover is the upload the selection
/// names, else the existing URL it names if still retained, else the first
/// image. With no images at all the cover falls back to `placeholder`.
pub fn reconcile(
    existing: &[String],
    uploaded: &[UploadedImage],
    cover: Option<&CoverSelection>,
    placeholder: &str,
) -> ReconciledImages {
    let images: Vec<String> = existing
        .iter()
        .cloned()
        .chain(uploaded.iter().map(|u| u.url.clone()))
        .collect();

    let chosen = match cover {
        Some(CoverSelection::Upload(key)) => uploaded
            .iter()
            .find(|u| &u.key == key)
            .map(|u| u.url.clone()),
        Some(CoverSelection::Existing(url)) => existing.iter().find(|e| *e == url).cloned(),
        None => None,
    };

    let image = chosen
        .or_else(|| images.first().cloned())
        .unwrap_or_else(|| placeholder.to_string());

    ReconciledImages {
        images_count: images.len(),
        image,
        images,
    }
}
