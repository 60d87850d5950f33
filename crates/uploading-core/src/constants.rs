//! Constants shared across the uploading crates.

/// Plugin identifier, also the webhook path segment (`/plugins/uploading`).
pub const PLUGIN_ID: &str = "uploading";

pub const PLUGIN_NAME: &str = "uploading";

pub const PLUGIN_DESCRIPTION: &str = "Plugin for S3 storage links";

/// Expiry applied to a signed upload grant when the caller gives none.
pub const DEFAULT_PRESIGNED_EXPIRES_SECS: i64 = 3600;

/// Upper bound accepted by SigV4 query signing (7 days).
pub const MAX_PRESIGNED_EXPIRES_SECS: i64 = 604_800;

/// Storage prefix for product media images.
pub const PRODUCT_MEDIA_PREFIX: &str = "products";

/// User agent sent with media probe and download requests.
pub const MEDIA_PROBE_USER_AGENT: &str = "Mozilla/5.0";

/// Node type name used in product global ids.
pub const PRODUCT_NODE_TYPE: &str = "Product";

/// Node type name used in product media global ids.
pub const PRODUCT_MEDIA_NODE_TYPE: &str = "ProductMedia";
