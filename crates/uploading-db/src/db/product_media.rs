use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uploading_core::models::{MediaAsset, MediaKind, NewMediaAsset};
use uploading_core::AppError;

use crate::traits::MediaAssetStore;

/// Repository for the host's `product_productmedia` table
#[derive(Clone)]
pub struct ProductMediaRepository {
    pool: PgPool,
}

impl ProductMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaAssetStore for ProductMediaRepository {
    async fn create_media(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError> {
        let media_type = media.kind.media_type().as_str();
        // The host keeps `image` non-null; external media store an empty path.
        let (image, external_url, oembed_data) = match &media.kind {
            MediaKind::Image { image } => (image.clone(), None, serde_json::json!({})),
            MediaKind::External {
                external_url,
                oembed_data,
                ..
            } => (String::new(), Some(external_url.clone()), oembed_data.clone()),
        };

        let row = sqlx::query(
            r#"
            INSERT INTO product_productmedia (
                product_id, alt, type, image, external_url, oembed_data,
                sort_order, metadata, private_metadata
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                (SELECT COALESCE(MAX(sort_order), -1) + 1
                 FROM product_productmedia WHERE product_id = $1),
                '{}'::jsonb, '{}'::jsonb
            )
            RETURNING id, sort_order
            "#,
        )
        .bind(media.product_id)
        .bind(&media.alt)
        .bind(media_type)
        .bind(image)
        .bind(external_url)
        .bind(oembed_data)
        .fetch_one(&self.pool)
        .await?;

        let id: i32 = row.try_get("id")?;
        let sort_order: Option<i32> = row.try_get("sort_order")?;

        tracing::info!(
            media_id = id,
            product_id = media.product_id,
            media_type = media_type,
            "Product media created"
        );

        Ok(MediaAsset {
            id,
            product_id: media.product_id,
            alt: media.alt,
            sort_order,
            kind: media.kind,
        })
    }
}
