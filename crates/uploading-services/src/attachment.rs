//! Attaching remote media to a product.
//!
//! Images are downloaded into storage under `products/` and queued for
//! thumbnailing. Everything else is kept as an external reference described by
//! its oEmbed document.

use std::sync::Arc;
use uploading_core::models::{MediaAsset, MediaKind, NewMediaAsset, Product};
use uploading_core::AppError;
use uploading_db::{MediaAssetStore, ThumbnailScheduler};
use uploading_storage::keys::product_media_key;
use uploading_storage::Storage;

use crate::classifier::{MediaClass, MediaClassifier};
use crate::error::MutationError;
use crate::naming::{guess_mime_from_url, unique_filename};
use crate::oembed::OembedResolver;
use crate::remote::RemoteMedia;

/// Attempts at finding a storage key that is not already taken.
const MAX_KEY_ATTEMPTS: usize = 3;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone)]
pub struct MediaAttachmentService {
    classifier: MediaClassifier,
    remote: Arc<dyn RemoteMedia>,
    oembed: Arc<dyn OembedResolver>,
    storage: Arc<dyn Storage>,
    media_store: Arc<dyn MediaAssetStore>,
    thumbnails: Arc<dyn ThumbnailScheduler>,
}

impl MediaAttachmentService {
    pub fn new(
        remote: Arc<dyn RemoteMedia>,
        oembed: Arc<dyn OembedResolver>,
        storage: Arc<dyn Storage>,
        media_store: Arc<dyn MediaAssetStore>,
        thumbnails: Arc<dyn ThumbnailScheduler>,
    ) -> Self {
        Self {
            classifier: MediaClassifier::new(remote.clone()),
            remote,
            oembed,
            storage,
            media_store,
            thumbnails,
        }
    }

    /// Classify `media_url` and attach it to `product`.
    #[tracing::instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn attach(
        &self,
        product: &Product,
        alt: &str,
        media_url: &str,
    ) -> Result<MediaAsset, MutationError> {
        let media = match self.classifier.classify(media_url).await? {
            MediaClass::Image => self.attach_image(product, alt, media_url).await?,
            MediaClass::External => self.attach_external(product, alt, media_url).await?,
        };

        tracing::info!(
            media_id = media.id,
            media_type = %media.kind.media_type(),
            "Product media created"
        );
        Ok(media)
    }

    async fn attach_image(
        &self,
        product: &Product,
        alt: &str,
        media_url: &str,
    ) -> Result<MediaAsset, MutationError> {
        let fetched = self.remote.fetch(media_url).await?;
        let storage_key = self.free_storage_key(media_url).await?;

        let content_type = fetched
            .content_type
            .or_else(|| guess_mime_from_url(media_url).map(|m| m.essence_str().to_string()))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        self.storage
            .upload_with_key(&storage_key, fetched.data, &content_type)
            .await?;

        let new_media = NewMediaAsset {
            product_id: product.id,
            alt: alt.to_string(),
            kind: MediaKind::image(storage_key.clone())?,
        };

        let media = match self.media_store.create_media(new_media).await {
            Ok(media) => media,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    tracing::warn!(
                        error = %cleanup,
                        key = %storage_key,
                        "Failed to remove stored image after database error"
                    );
                }
                return Err(e.into());
            }
        };

        match self.thumbnails.schedule_thumbnail(media.id).await {
            Ok(task) => {
                tracing::debug!(task_id = %task.id, media_id = media.id, "Thumbnail task scheduled")
            }
            Err(e) => {
                tracing::warn!(error = %e, media_id = media.id, "Failed to schedule thumbnail task")
            }
        }

        Ok(media)
    }

    async fn attach_external(
        &self,
        product: &Product,
        alt: &str,
        media_url: &str,
    ) -> Result<MediaAsset, MutationError> {
        let oembed = self.oembed.resolve(media_url).await?;

        let new_media = NewMediaAsset {
            product_id: product.id,
            alt: oembed.title.unwrap_or_else(|| alt.to_string()),
            kind: MediaKind::external(oembed.url, oembed.raw, oembed.media_type)?,
        };

        Ok(self.media_store.create_media(new_media).await?)
    }

    async fn free_storage_key(&self, media_url: &str) -> Result<String, MutationError> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = product_media_key(&unique_filename(media_url));
            if !self.storage.exists(&key).await? {
                return Ok(key);
            }
            tracing::debug!(key = %key, "Storage key already taken, regenerating");
        }
        Err(AppError::Storage(format!(
            "Could not find a free storage key after {} attempts",
            MAX_KEY_ATTEMPTS
        ))
        .into())
    }
}
