//! Application state shared by all handlers.

use sqlx::PgPool;
use std::sync::Arc;
use uploading_services::MutationSet;
use uploading_storage::Storage;

use crate::graphql::UploadingSchema;

#[derive(Clone)]
pub struct AppState {
    /// Host database; used by the readiness probe.
    pub pool: PgPool,
    pub storage: Arc<dyn Storage>,
    pub schema: UploadingSchema,
    /// Hides error details in HTTP error bodies.
    pub is_production: bool,
}

impl AppState {
    /// Build state and the GraphQL schema around one set of mutations.
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn Storage>,
        mutations: MutationSet,
        is_production: bool,
    ) -> Self {
        let schema = crate::graphql::build_schema(mutations, storage.clone());
        Self {
            pool,
            storage,
            schema,
            is_production,
        }
    }
}
