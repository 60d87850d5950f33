//! Route configuration and setup.

mod health;

use crate::constants::{GRAPHQL_PATH, MAX_REQUEST_BODY_BYTES, PLUGIN_WEBHOOK_PATH};
use crate::graphql::{graphiql, graphql_handler, plugin_webhook};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uploading_core::Config;

const HTTP_CONCURRENCY_LIMIT: usize = 1_024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    Ok(build_router(state, config.cors_origins()))
}

/// Router for `state` with CORS restricted to `cors_origins` (`*` allows any).
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router<()> {
    let webhook_subpaths = format!("{}/{{*path}}", PLUGIN_WEBHOOK_PATH);

    Router::new()
        .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
        .route(PLUGIN_WEBHOOK_PATH, any(plugin_webhook))
        .route(&webhook_subpaths, any(plugin_webhook))
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(setup_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn setup_cors(cors_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    }
}
