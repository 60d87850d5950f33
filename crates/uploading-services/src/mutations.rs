//! Mutation interface
//!
//! Every mutation validates its raw input into a `Validated` value and then
//! performs it. [`MutationRequest`] and [`MutationResponse`] tag the mutations
//! so a transport can route them through a single [`MutationSet::dispatch`].

use async_trait::async_trait;
use std::sync::Arc;
use uploading_core::constants::PRODUCT_NODE_TYPE;
use uploading_core::models::{MediaAsset, Product, SignedUploadGrant};
use uploading_core::GlobalId;
use uploading_db::ProductLookup;

use crate::attachment::MediaAttachmentService;
use crate::error::{MutationError, ValidationCode};
use crate::presign::PresignedUrlIssuer;

#[async_trait]
pub trait Mutation: Send + Sync {
    type Input: Send + 'static;
    type Validated: Send + 'static;
    type Output: Send + 'static;

    async fn validate(&self, input: Self::Input) -> Result<Self::Validated, MutationError>;

    async fn perform(&self, validated: Self::Validated) -> Result<Self::Output, MutationError>;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, MutationError> {
        let validated = self.validate(input).await?;
        self.perform(validated).await
    }
}

/// Resolves product global ids to host products.
#[derive(Clone)]
pub struct ProductResolver {
    lookup: Arc<dyn ProductLookup>,
}

impl ProductResolver {
    pub fn new(lookup: Arc<dyn ProductLookup>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, raw_id: &str) -> Result<Product, MutationError> {
        let pk = GlobalId::parse_pk(raw_id, PRODUCT_NODE_TYPE)?;
        self.lookup
            .find_product(pk)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("Couldn't resolve to a node: {}", raw_id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    pub object_name: String,
    pub expires: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPresign {
    pub object_name: String,
    pub expires_in_secs: i64,
}

#[derive(Clone)]
pub struct CreatePreSignedUrl {
    issuer: PresignedUrlIssuer,
}

impl CreatePreSignedUrl {
    pub fn new(issuer: PresignedUrlIssuer) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl Mutation for CreatePreSignedUrl {
    type Input = PresignRequest;
    type Validated = ValidatedPresign;
    type Output = SignedUploadGrant;

    async fn validate(&self, input: PresignRequest) -> Result<ValidatedPresign, MutationError> {
        let expires_in_secs = self
            .issuer
            .validate_request(&input.object_name, input.expires)?;
        Ok(ValidatedPresign {
            object_name: input.object_name,
            expires_in_secs,
        })
    }

    async fn perform(&self, validated: ValidatedPresign) -> Result<SignedUploadGrant, MutationError> {
        self.issuer
            .sign(&validated.object_name, validated.expires_in_secs)
            .await
    }
}

/// Raw `ProductMediaCreateInputExtended`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMediaInput {
    pub product_id: String,
    pub alt: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProductMedia {
    pub product: Product,
    pub alt: String,
    pub media_url: String,
}

#[derive(Clone)]
pub struct ProductMediaCreateExtended {
    products: ProductResolver,
    attachments: MediaAttachmentService,
}

impl ProductMediaCreateExtended {
    pub fn new(products: ProductResolver, attachments: MediaAttachmentService) -> Self {
        Self {
            products,
            attachments,
        }
    }
}

#[async_trait]
impl Mutation for ProductMediaCreateExtended {
    type Input = ProductMediaInput;
    type Validated = ValidatedProductMedia;
    type Output = MediaAsset;

    async fn validate(
        &self,
        input: ProductMediaInput,
    ) -> Result<ValidatedProductMedia, MutationError> {
        // Checked first: no lookups or requests for an input without a URL.
        let media_url = input
            .media_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                MutationError::validation(
                    "input",
                    "Image or external URL is required.",
                    ValidationCode::Required,
                )
            })?;

        let product = self.products.resolve(&input.product_id).await?;

        Ok(ValidatedProductMedia {
            product,
            alt: input.alt.unwrap_or_default(),
            media_url,
        })
    }

    async fn perform(&self, validated: ValidatedProductMedia) -> Result<MediaAsset, MutationError> {
        self.attachments
            .attach(&validated.product, &validated.alt, &validated.media_url)
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    CreatePreSignedUrl(PresignRequest),
    ProductMediaCreateExtended(ProductMediaInput),
}

impl MutationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            MutationRequest::CreatePreSignedUrl(_) => "createPreSignedUrl",
            MutationRequest::ProductMediaCreateExtended(_) => "productMediaCreateExtended",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationResponse {
    CreatePreSignedUrl(SignedUploadGrant),
    ProductMediaCreateExtended(MediaAsset),
}

/// All mutations the plugin exposes.
#[derive(Clone)]
pub struct MutationSet {
    pub create_presigned_url: CreatePreSignedUrl,
    pub product_media_create_extended: ProductMediaCreateExtended,
}

impl MutationSet {
    pub fn new(
        create_presigned_url: CreatePreSignedUrl,
        product_media_create_extended: ProductMediaCreateExtended,
    ) -> Self {
        Self {
            create_presigned_url,
            product_media_create_extended,
        }
    }

    #[tracing::instrument(skip_all, fields(mutation = request.name()))]
    pub async fn dispatch(
        &self,
        request: MutationRequest,
    ) -> Result<MutationResponse, MutationError> {
        let result = match request {
            MutationRequest::CreatePreSignedUrl(input) => self
                .create_presigned_url
                .execute(input)
                .await
                .map(MutationResponse::CreatePreSignedUrl),
            MutationRequest::ProductMediaCreateExtended(input) => self
                .product_media_create_extended
                .execute(input)
                .await
                .map(MutationResponse::ProductMediaCreateExtended),
        };

        if let Err(e) = &result {
            if e.is_field_error() {
                tracing::debug!(error = %e, "Mutation rejected");
            } else {
                tracing::warn!(error = %e, "Mutation failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use uploading_core::models::MediaKind;

    const PRODUCT_72: &str = "UHJvZHVjdDo3Mg==";

    fn media_input(product_id: &str, alt: Option<&str>, media_url: Option<&str>) -> MutationRequest {
        MutationRequest::ProductMediaCreateExtended(ProductMediaInput {
            product_id: product_id.to_string(),
            alt: alt.map(String::from),
            media_url: media_url.map(String::from),
        })
    }

    fn with_product(mocks: &MockCollaborators) {
        mocks.products.add_product(sample_product(72));
    }

    #[tokio::test]
    async fn test_empty_media_url_is_required_before_any_lookup() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::serving("image/png", b"png"),
            MockOembedResolver::video("Cat Video"),
        );
        with_product(&mocks);
        let mutations = mocks.mutation_set(Some("media"));

        for media_url in [Some(""), Some("   "), None] {
            let err = mutations
                .dispatch(media_input(PRODUCT_72, Some("A cat"), media_url))
                .await
                .unwrap_err();
            match err {
                MutationError::Validation {
                    field,
                    message,
                    code,
                } => {
                    assert_eq!(field.as_deref(), Some("input"));
                    assert_eq!(message, "Image or external URL is required.");
                    assert_eq!(code, ValidationCode::Required);
                }
                other => panic!("Expected Validation, got {:?}", other),
            }
        }

        assert_eq!(mocks.remote.request_count(), 0);
        assert_eq!(mocks.oembed.call_count(), 0);
        assert_eq!(mocks.products.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_image_url_creates_image_media_and_one_thumbnail() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::serving("image/png", b"\x89PNG"),
            MockOembedResolver::video("unused"),
        );
        with_product(&mocks);

        let response = mocks
            .mutation_set(Some("media"))
            .dispatch(media_input(
                PRODUCT_72,
                Some("A cat"),
                Some("http://example.com/cat.png"),
            ))
            .await
            .unwrap();

        let media = match response {
            MutationResponse::ProductMediaCreateExtended(media) => media,
            other => panic!("Unexpected response {:?}", other),
        };
        assert_eq!(media.alt, "A cat");
        assert!(media.kind.is_image());
        assert_eq!(mocks.media.all().len(), 1);
        assert_eq!(mocks.thumbnails.scheduled_media_ids(), vec![media.id]);
    }

    #[tokio::test]
    async fn test_video_url_creates_external_media_titled_by_oembed() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::serving("text/html; charset=utf-8", b""),
            MockOembedResolver::video("Cat Video"),
        );
        with_product(&mocks);

        let response = mocks
            .mutation_set(Some("media"))
            .dispatch(media_input(
                PRODUCT_72,
                None,
                Some("https://youtube.com/watch?v=abc"),
            ))
            .await
            .unwrap();

        let MutationResponse::ProductMediaCreateExtended(media) = response else {
            panic!("Unexpected response");
        };
        assert_eq!(media.alt, "Cat Video");
        assert!(matches!(media.kind, MediaKind::External { .. }));
        assert_eq!(mocks.media.all().len(), 1);
        assert!(mocks.thumbnails.scheduled_media_ids().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::serving("image/png", b"png"),
            MockOembedResolver::video("unused"),
        );

        let err = mocks
            .mutation_set(Some("media"))
            .dispatch(media_input(
                PRODUCT_72,
                None,
                Some("http://example.com/cat.png"),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::NotFound(_)));
        assert_eq!(mocks.remote.request_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_product_id_is_field_error() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::serving("image/png", b"png"),
            MockOembedResolver::video("unused"),
        );
        let media_id = GlobalId::new("ProductMedia", 1).encode();

        for raw in ["not-an-id", media_id.as_str()] {
            let err = mocks
                .mutation_set(Some("media"))
                .dispatch(media_input(raw, None, Some("http://example.com/cat.png")))
                .await
                .unwrap_err();
            match err {
                MutationError::Validation { field, code, .. } => {
                    assert_eq!(field.as_deref(), Some("productExtend"));
                    assert_eq!(code, ValidationCode::InvalidFieldValue);
                }
                other => panic!("Expected Validation, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_presign_dispatch_uses_default_expiry() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::default(),
            MockOembedResolver::default(),
        );

        let response = mocks
            .mutation_set(Some("media"))
            .dispatch(MutationRequest::CreatePreSignedUrl(PresignRequest {
                object_name: "uploads/cat.png".to_string(),
                expires: None,
            }))
            .await
            .unwrap();

        let MutationResponse::CreatePreSignedUrl(grant) = response else {
            panic!("Unexpected response");
        };
        assert_eq!(grant.expires_in_secs, 3600);
        assert_eq!(grant.key, "uploads/cat.png");
        assert_eq!(
            mocks.storage.signed_requests(),
            vec![(
                "uploads/cat.png".to_string(),
                std::time::Duration::from_secs(3600)
            )]
        );
    }

    #[tokio::test]
    async fn test_presign_without_bucket_is_configuration_error() {
        let mocks = MockCollaborators::new(
            MockRemoteMedia::default(),
            MockOembedResolver::default(),
        );

        let err = mocks
            .mutation_set(None)
            .create_presigned_url
            .execute(PresignRequest {
                object_name: "cat.png".to_string(),
                expires: Some(60),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::Configuration(_)));
        assert!(mocks.storage.signed_requests().is_empty());
    }
}
