use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::AppError;

/// Host media type column (`product_productmedia.type`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductMediaType {
    Image,
    Video,
}

impl ProductMediaType {
    /// Map an oEmbed `type` field onto the host media type.
    pub fn from_oembed_type(oembed_type: &str) -> Option<Self> {
        match oembed_type {
            "photo" => Some(ProductMediaType::Image),
            "video" => Some(ProductMediaType::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductMediaType::Image => "IMAGE",
            ProductMediaType::Video => "VIDEO",
        }
    }
}

impl Display for ProductMediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductMediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMAGE" => Ok(ProductMediaType::Image),
            "VIDEO" => Ok(ProductMediaType::Video),
            _ => Err(anyhow::anyhow!("Invalid product media type: {}", s)),
        }
    }
}

/// Kind-specific payload of a media asset.
///
/// An image asset always carries the storage key of the stored file; an external
/// asset always carries a non-empty URL and the oEmbed document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Image {
        image: String,
    },
    External {
        external_url: String,
        oembed_data: JsonValue,
        media_type: ProductMediaType,
    },
}

impl MediaKind {
    pub fn image(storage_key: impl Into<String>) -> Result<Self, AppError> {
        let image = storage_key.into();
        if image.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Image media requires a storage key".to_string(),
            ));
        }
        Ok(MediaKind::Image { image })
    }

    pub fn external(
        external_url: impl Into<String>,
        oembed_data: JsonValue,
        media_type: ProductMediaType,
    ) -> Result<Self, AppError> {
        let external_url = external_url.into();
        if external_url.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "External media requires a non-empty URL".to_string(),
            ));
        }
        Ok(MediaKind::External {
            external_url,
            oembed_data,
            media_type,
        })
    }

    pub fn media_type(&self) -> ProductMediaType {
        match self {
            MediaKind::Image { .. } => ProductMediaType::Image,
            MediaKind::External { media_type, .. } => *media_type,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image { .. })
    }
}

/// Media asset to be attached to a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaAsset {
    pub product_id: i32,
    pub alt: String,
    pub kind: MediaKind,
}

/// Stored product media row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: i32,
    pub product_id: i32,
    pub alt: String,
    pub sort_order: Option<i32>,
    pub kind: MediaKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_requires_url() {
        assert!(MediaKind::external("", json!({}), ProductMediaType::Video).is_err());
        assert!(MediaKind::external("  ", json!({}), ProductMediaType::Video).is_err());
    }

    #[test]
    fn test_image_requires_key() {
        assert!(MediaKind::image("").is_err());
        let kind = MediaKind::image("products/cat_0a1b2c3d.png").unwrap();
        assert!(kind.is_image());
        assert_eq!(kind.media_type(), ProductMediaType::Image);
    }

    #[test]
    fn test_oembed_type_mapping() {
        assert_eq!(
            ProductMediaType::from_oembed_type("photo"),
            Some(ProductMediaType::Image)
        );
        assert_eq!(
            ProductMediaType::from_oembed_type("video"),
            Some(ProductMediaType::Video)
        );
        assert_eq!(ProductMediaType::from_oembed_type("rich"), None);
    }

    #[test]
    fn test_kind_serializes_with_tag() {
        let kind = MediaKind::external(
            "https://youtube.com/watch?v=abc",
            json!({"title": "Cat Video"}),
            ProductMediaType::Video,
        )
        .unwrap();
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["kind"], "EXTERNAL");
        assert_eq!(value["media_type"], "VIDEO");
    }
}
