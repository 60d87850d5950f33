//! GraphQL API
//!
//! Schema, the `/graphql/` handlers and the plugin webhook entry point, which
//! forwards any request under `/plugins/uploading` to the same executor.

pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use async_graphql_axum::rejection::GraphQLRejection;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRequest, Request, State},
    http::Method,
    response::{Html, IntoResponse, Response},
    Extension,
};
use std::sync::Arc;
use uploading_core::constants::PLUGIN_ID;
use uploading_core::AppError;
use uploading_services::MutationSet;
use uploading_storage::Storage;

use crate::constants::GRAPHQL_PATH;
use crate::error::HttpAppError;
use crate::middleware::RequestId;
use crate::state::AppState;

pub use mutation::Mutation;
pub use query::Query;

/// GraphQL schema type
pub type UploadingSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the GraphQL schema
pub fn build_schema(mutations: MutationSet, storage: Arc<dyn Storage>) -> UploadingSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(mutations)
        .data(storage)
        .finish()
}

pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    graphiql_page(GRAPHQL_PATH)
}

fn graphiql_page(endpoint: &str) -> Html<String> {
    Html(
        GraphiQLSource::build()
            .endpoint(endpoint)
            .title("Uploading plugin")
            .finish(),
    )
}

/// Plugin webhook: every method, every sub-path.
///
/// A bare GET serves GraphiQL pointed back at the same path; everything else is
/// parsed as a GraphQL request and executed.
pub async fn plugin_webhook(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    request: Request,
) -> Response {
    let path = request.uri().path().to_string();
    tracing::debug!(
        plugin = PLUGIN_ID,
        path = %path,
        method = %request.method(),
        request_id = request_id.as_ref().map(|Extension(id)| id.0.as_str()),
        "Plugin webhook request"
    );

    if request.method() == Method::GET && request.uri().query().is_none() {
        return graphiql_page(&path).into_response();
    }

    match GraphQLRequest::<GraphQLRejection>::from_request(request, &()).await {
        Ok(req) => GraphQLResponse::from(state.schema.execute(req.into_inner()).await)
            .into_response(),
        Err(rejection) => HttpAppError::new(
            AppError::InvalidInput(format!("Invalid GraphQL request: {}", rejection.0)),
            state.is_production,
        )
        .into_response(),
    }
}
