//! Mutation root and the shared resolver bodies.

use async_graphql::{Context, Object, Result};
use uploading_core::AppError;
use uploading_services::{
    MutationError, MutationRequest, MutationResponse, MutationSet, PresignRequest,
    ProductMediaInput,
};

use super::types::{
    CreatePreSignedUrlPayload, ProductMediaCreateExtendedPayload, ProductMediaCreateInputExtended,
};
use crate::error::graphql_error;

#[derive(Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    /// Signed URL for uploading `objectName` straight into the media bucket.
    async fn create_pre_signed_url(
        &self,
        ctx: &Context<'_>,
        object_name: String,
        #[graphql(desc = "Validity in seconds (default 3600).")] expires: Option<i32>,
    ) -> Result<CreatePreSignedUrlPayload> {
        create_pre_signed_url(ctx.data_unchecked::<MutationSet>(), object_name, expires).await
    }

    /// Attach an image or an oEmbed-resolvable media URL to a product.
    async fn product_media_create_extended(
        &self,
        ctx: &Context<'_>,
        input: ProductMediaCreateInputExtended,
    ) -> Result<ProductMediaCreateExtendedPayload> {
        let request = MutationRequest::ProductMediaCreateExtended(ProductMediaInput {
            product_id: input.product_extend.0,
            alt: input.alt,
            media_url: input.media_url,
        });

        match ctx.data_unchecked::<MutationSet>().dispatch(request).await {
            Ok(MutationResponse::ProductMediaCreateExtended(media)) => {
                Ok(ProductMediaCreateExtendedPayload::created(media))
            }
            Ok(_) => Err(unexpected_response()),
            Err(e) if e.is_field_error() => Ok(ProductMediaCreateExtendedPayload::rejected(e)),
            Err(e) => Err(graphql_error(e)),
        }
    }
}

/// Exposed on both roots.
pub(crate) async fn create_pre_signed_url(
    mutations: &MutationSet,
    object_name: String,
    expires: Option<i32>,
) -> Result<CreatePreSignedUrlPayload> {
    let request = MutationRequest::CreatePreSignedUrl(PresignRequest {
        object_name,
        expires: expires.map(i64::from),
    });

    match mutations.dispatch(request).await {
        Ok(MutationResponse::CreatePreSignedUrl(grant)) => {
            Ok(CreatePreSignedUrlPayload::from_grant(grant))
        }
        Ok(_) => Err(unexpected_response()),
        Err(e) if e.is_field_error() => Ok(CreatePreSignedUrlPayload::from_error(e)),
        Err(e) => Err(graphql_error(e)),
    }
}

fn unexpected_response() -> async_graphql::Error {
    graphql_error(MutationError::Internal(AppError::Internal(
        "Mutation dispatch returned a response for another mutation".to_string(),
    )))
}
