//! HTTP route constants

/// GraphQL endpoint (with trailing slash, as the host serves it).
pub const GRAPHQL_PATH: &str = "/graphql/";

/// Plugin webhook prefix; any sub-path is forwarded to the GraphQL executor.
pub const PLUGIN_WEBHOOK_PATH: &str = "/plugins/uploading";

/// Upper bound for GraphQL request bodies.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
