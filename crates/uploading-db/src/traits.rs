use async_trait::async_trait;
use uploading_core::models::{MediaAsset, NewMediaAsset, Product, ThumbnailTask};
use uploading_core::AppError;

/// Product lookup by primary key.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, AppError>;
}

/// Append-only store for product media assets.
#[async_trait]
pub trait MediaAssetStore: Send + Sync {
    /// Persist a new asset at the end of the product's media ordering.
    async fn create_media(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError>;
}

/// Hands thumbnail generation to the host's worker. Callers do not wait for it.
#[async_trait]
pub trait ThumbnailScheduler: Send + Sync {
    async fn schedule_thumbnail(&self, media_id: i32) -> Result<ThumbnailTask, AppError>;
}
