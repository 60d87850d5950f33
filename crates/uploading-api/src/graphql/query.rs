use async_graphql::{Context, Object, Result, ID};
use uploading_services::MutationSet;

use super::types::CreatePreSignedUrlPayload;
use crate::plugin::PluginManifest;

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    /// Same as the mutation; kept on the query root for existing clients.
    async fn create_pre_signed_url(
        &self,
        ctx: &Context<'_>,
        object_name: String,
        expires: Option<i32>,
    ) -> Result<CreatePreSignedUrlPayload> {
        super::mutation::create_pre_signed_url(
            ctx.data_unchecked::<MutationSet>(),
            object_name,
            expires,
        )
        .await
    }

    /// Manifest of the plugin with the given id, if it is this one.
    async fn plugin(&self, id: ID) -> Option<PluginManifest> {
        let manifest = PluginManifest::uploading();
        manifest.matches(id.as_str()).then_some(manifest)
    }
}
