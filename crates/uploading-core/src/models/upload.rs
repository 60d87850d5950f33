use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time-limited authorization for a single `PUT` of `key` into the media bucket.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedUploadGrant {
    pub url: String,
    pub key: String,
    pub expires_in_secs: i64,
    pub expires_at: DateTime<Utc>,
    pub aws_access_key_id: Option<String>,
}
