//! GraphQL object, input and error types.

use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uploading_core::constants::PRODUCT_MEDIA_NODE_TYPE;
use uploading_core::models::{MediaAsset, MediaKind, ProductMediaType, SignedUploadGrant};
use uploading_core::GlobalId;
use uploading_services::{MutationError, ValidationCode};
use uploading_storage::Storage;

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PreSignedErrorCode {
    Invalid,
}

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProductExtendErrorCode {
    InvalidFieldValue,
    Required,
}

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
#[graphql(name = "ProductMediaType")]
pub enum MediaTypeEnum {
    Image,
    Video,
}

impl From<ProductMediaType> for MediaTypeEnum {
    fn from(media_type: ProductMediaType) -> Self {
        match media_type {
            ProductMediaType::Image => MediaTypeEnum::Image,
            ProductMediaType::Video => MediaTypeEnum::Video,
        }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct PreSignedError {
    /// Name of the offending argument; null for errors not tied to one.
    pub field: Option<String>,
    pub message: Option<String>,
    pub code: PreSignedErrorCode,
}

impl From<MutationError> for PreSignedError {
    fn from(err: MutationError) -> Self {
        let field = match &err {
            MutationError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        Self {
            field,
            message: Some(err.to_string()),
            code: PreSignedErrorCode::Invalid,
        }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct ProductExtendError {
    pub field: Option<String>,
    pub message: Option<String>,
    pub code: ProductExtendErrorCode,
}

impl From<MutationError> for ProductExtendError {
    fn from(err: MutationError) -> Self {
        let (field, code) = match &err {
            MutationError::Validation { field, code, .. } => (
                field.clone(),
                match code {
                    ValidationCode::Required => ProductExtendErrorCode::Required,
                    ValidationCode::Invalid | ValidationCode::InvalidFieldValue => {
                        ProductExtendErrorCode::InvalidFieldValue
                    }
                },
            ),
            _ => (None, ProductExtendErrorCode::InvalidFieldValue),
        };
        Self {
            field,
            message: Some(err.to_string()),
            code,
        }
    }
}

/// Result of `createPreSignedUrl`. `policy` and `signature` stay null: the
/// signature travels in the URL's query string.
#[derive(SimpleObject, Clone, Debug, Default)]
#[graphql(name = "CreatePreSignedUrl")]
pub struct CreatePreSignedUrlPayload {
    pub policy: Option<String>,
    pub url: Option<String>,
    pub signature: Option<String>,
    pub key: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub errors: Vec<PreSignedError>,
}

impl CreatePreSignedUrlPayload {
    pub fn from_grant(grant: SignedUploadGrant) -> Self {
        Self {
            url: Some(grant.url),
            key: Some(grant.key),
            aws_access_key_id: grant.aws_access_key_id,
            expires_at: Some(grant.expires_at),
            ..Default::default()
        }
    }

    pub fn from_error(err: MutationError) -> Self {
        Self {
            errors: vec![err.into()],
            ..Default::default()
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct ProductMediaCreateInputExtended {
    /// Global id of the product the media is attached to.
    pub product_extend: ID,
    pub alt: Option<String>,
    /// Image to download, or a video/photo page resolved through oEmbed.
    pub media_url: Option<String>,
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct ProductMediaExtended {
    pub id: ID,
    pub alt: String,
    pub sort_order: Option<i32>,
    #[graphql(name = "type")]
    pub media_type: MediaTypeEnum,
    /// oEmbed document as a JSON string; `{}` for stored images.
    pub oembed_data: String,
    #[graphql(skip)]
    pub external_url: Option<String>,
    #[graphql(skip)]
    pub image_key: Option<String>,
}

impl From<MediaAsset> for ProductMediaExtended {
    fn from(media: MediaAsset) -> Self {
        let media_type = media.kind.media_type().into();
        let (external_url, image_key, oembed_data) = match media.kind {
            MediaKind::Image { image } => (None, Some(image), "{}".to_string()),
            MediaKind::External {
                external_url,
                oembed_data,
                ..
            } => (Some(external_url), None, oembed_data.to_string()),
        };
        Self {
            id: ID(GlobalId::new(PRODUCT_MEDIA_NODE_TYPE, media.id).encode()),
            alt: media.alt,
            sort_order: media.sort_order,
            media_type,
            oembed_data,
            external_url,
            image_key,
        }
    }
}

#[ComplexObject]
impl ProductMediaExtended {
    /// External URL for referenced media, the stored image URL otherwise.
    /// With `size`, images point at the host's thumbnail route instead.
    async fn url(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<String> {
        if let Some(url) = &self.external_url {
            return Ok(url.clone());
        }
        let key = self
            .image_key
            .as_deref()
            .ok_or_else(|| async_graphql::Error::new("Media has no stored image"))?;

        match size {
            Some(size) if size <= 0 => Err(async_graphql::Error::new(
                "Thumbnail size must be a positive integer",
            )),
            Some(size) => Ok(format!("/thumbnail/{}/{}/", self.id.as_str(), size)),
            None => Ok(ctx.data_unchecked::<Arc<dyn Storage>>().public_url(key)),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "ProductMediaCreateExtended")]
pub struct ProductMediaCreateExtendedPayload {
    /// True iff the media was created.
    pub ok: bool,
    pub media: Option<ProductMediaExtended>,
    pub errors: Vec<ProductExtendError>,
}

impl ProductMediaCreateExtendedPayload {
    pub fn created(media: MediaAsset) -> Self {
        Self {
            ok: true,
            media: Some(media.into()),
            errors: Vec::new(),
        }
    }

    pub fn rejected(err: MutationError) -> Self {
        Self {
            ok: false,
            media: None,
            errors: vec![err.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_code_maps_through() {
        let err = ProductExtendError::from(MutationError::validation(
            "input",
            "Image or external URL is required.",
            ValidationCode::Required,
        ));
        assert_eq!(err.field.as_deref(), Some("input"));
        assert_eq!(err.code, ProductExtendErrorCode::Required);
    }

    #[test]
    fn test_configuration_error_has_no_field() {
        let err = PreSignedError::from(MutationError::Configuration(
            "The AWS_MEDIA_BUCKET_NAME environment variable is not set.".into(),
        ));
        assert_eq!(err.field, None);
        assert_eq!(err.code, PreSignedErrorCode::Invalid);
        assert_eq!(
            err.message.as_deref(),
            Some("The AWS_MEDIA_BUCKET_NAME environment variable is not set.")
        );
    }

    #[test]
    fn test_external_media_conversion() {
        let media = MediaAsset {
            id: 3,
            product_id: 72,
            alt: "Cat Video".into(),
            sort_order: Some(1),
            kind: MediaKind::External {
                external_url: "https://youtube.com/watch?v=abc".into(),
                oembed_data: json!({"type": "video"}),
                media_type: ProductMediaType::Video,
            },
        };
        let gql = ProductMediaExtended::from(media);
        assert_eq!(gql.id.as_str(), "UHJvZHVjdE1lZGlhOjM=");
        assert_eq!(gql.media_type, MediaTypeEnum::Video);
        assert_eq!(gql.oembed_data, r#"{"type":"video"}"#);
        assert_eq!(
            gql.external_url.as_deref(),
            Some("https://youtube.com/watch?v=abc")
        );
    }
}
