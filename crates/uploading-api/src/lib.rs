//! Uploading API Library
//!
//! HTTP surface of the uploading plugin: the GraphQL schema, the plugin webhook
//! entry point, health checks and application setup.

pub mod constants;
pub mod error;
pub mod graphql;
mod middleware;
pub mod plugin;
pub mod setup;
pub mod state;
mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use graphql::{build_schema, UploadingSchema};
pub use state::AppState;
