//! Signed upload grants for direct client uploads into the media bucket.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use uploading_core::constants::MAX_PRESIGNED_EXPIRES_SECS;
use uploading_core::models::SignedUploadGrant;
use uploading_core::Config;
use uploading_storage::{Storage, StorageError};

use crate::error::{MutationError, ValidationCode};

pub const BUCKET_NOT_CONFIGURED: &str = "The AWS_MEDIA_BUCKET_NAME environment variable is not set.";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Issues signed `PUT` URLs. Stateless: nothing is written to the bucket.
#[derive(Clone)]
pub struct PresignedUrlIssuer {
    bucket: Option<String>,
    access_key_id: Option<String>,
    storage: Arc<dyn Storage>,
    default_expires_secs: i64,
}

impl PresignedUrlIssuer {
    pub fn new(
        bucket: Option<String>,
        access_key_id: Option<String>,
        storage: Arc<dyn Storage>,
        default_expires_secs: i64,
    ) -> Self {
        Self {
            bucket,
            access_key_id,
            storage,
            default_expires_secs,
        }
    }

    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Self {
        Self::new(
            config.media_bucket_name().map(String::from),
            config.aws_access_key_id().map(String::from),
            storage,
            config.presigned_default_expires_secs(),
        )
    }

    pub fn default_expires_secs(&self) -> i64 {
        self.default_expires_secs
    }

    /// Fails with `Configuration` when no media bucket is set, and only then.
    pub fn check_configured(&self) -> Result<&str, MutationError> {
        self.bucket
            .as_deref()
            .ok_or_else(|| MutationError::Configuration(BUCKET_NOT_CONFIGURED.to_string()))
    }

    /// Check the request and return the effective expiry in seconds.
    pub fn validate_request(
        &self,
        object_name: &str,
        expires: Option<i64>,
    ) -> Result<i64, MutationError> {
        self.check_configured()?;

        if object_name.trim().is_empty() {
            return Err(MutationError::validation(
                "objectName",
                "Object name cannot be empty.",
                ValidationCode::Invalid,
            ));
        }

        let expires_in_secs = expires.unwrap_or(self.default_expires_secs);
        if !(1..=MAX_PRESIGNED_EXPIRES_SECS).contains(&expires_in_secs) {
            return Err(MutationError::validation(
                "expires",
                format!(
                    "Expiration must be between 1 and {} seconds.",
                    MAX_PRESIGNED_EXPIRES_SECS
                ),
                ValidationCode::Invalid,
            ));
        }

        Ok(expires_in_secs)
    }

    pub async fn issue(
        &self,
        object_name: &str,
        expires: Option<i64>,
    ) -> Result<SignedUploadGrant, MutationError> {
        let expires_in_secs = self.validate_request(object_name, expires)?;
        self.sign(object_name, expires_in_secs).await
    }

    /// Sign an already validated request.
    #[tracing::instrument(skip(self))]
    pub async fn sign(
        &self,
        object_name: &str,
        expires_in_secs: i64,
    ) -> Result<SignedUploadGrant, MutationError> {
        let bucket = self.check_configured()?;

        let content_type = mime_guess::from_path(object_name)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE);

        let url = self
            .storage
            .presigned_put_url(
                object_name,
                content_type,
                Duration::from_secs(expires_in_secs as u64),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %bucket, key = %object_name, "Failed to sign upload URL");
                match e {
                    StorageError::BackendError(cause) => MutationError::Backend(cause),
                    other => MutationError::Backend(other.to_string()),
                }
            })?;

        tracing::info!(bucket = %bucket, key = %object_name, expires_in_secs, "Issued signed upload URL");

        Ok(SignedUploadGrant {
            url,
            key: object_name.to_string(),
            expires_in_secs,
            expires_at: Utc::now() + ChronoDuration::seconds(expires_in_secs),
            aws_access_key_id: self.access_key_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uploading_storage::{StorageBackend, StorageResult};

    #[derive(Default)]
    struct SigningStub {
        fail_with: Option<String>,
        signed: Mutex<Vec<(String, String, Duration)>>,
    }

    #[async_trait]
    impl Storage for SigningStub {
        async fn upload_with_key(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<String> {
            unreachable!("signing never uploads")
        }

        async fn delete(&self, _: &str) -> StorageResult<()> {
            unreachable!("signing never deletes")
        }

        async fn presigned_put_url(
            &self,
            storage_key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            if let Some(cause) = &self.fail_with {
                return Err(StorageError::BackendError(cause.clone()));
            }
            self.signed.lock().unwrap().push((
                storage_key.to_string(),
                content_type.to_string(),
                expires_in,
            ));
            Ok(format!(
                "https://media.s3.amazonaws.com/{}?X-Amz-Expires={}",
                storage_key,
                expires_in.as_secs()
            ))
        }

        async fn exists(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }

        fn public_url(&self, storage_key: &str) -> String {
            format!("https://media.s3.amazonaws.com/{}", storage_key)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }
    }

    fn issuer(bucket: Option<&str>, storage: Arc<SigningStub>) -> PresignedUrlIssuer {
        PresignedUrlIssuer::new(
            bucket.map(String::from),
            Some("AKIAEXAMPLE".to_string()),
            storage,
            3600,
        )
    }

    #[tokio::test]
    async fn test_default_expiry_is_one_hour() {
        let storage = Arc::new(SigningStub::default());
        let grant = issuer(Some("media"), storage.clone())
            .issue("uploads/cat.png", None)
            .await
            .unwrap();

        assert_eq!(grant.expires_in_secs, 3600);
        assert_eq!(grant.key, "uploads/cat.png");
        assert_eq!(grant.aws_access_key_id.as_deref(), Some("AKIAEXAMPLE"));
        assert!(grant.url.contains("X-Amz-Expires=3600"));

        let signed = storage.signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].1, "image/png");
        assert_eq!(signed[0].2, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_missing_bucket_is_configuration_error() {
        let storage = Arc::new(SigningStub::default());
        let err = issuer(None, storage.clone())
            .issue("uploads/cat.png", Some(60))
            .await
            .unwrap_err();

        match err {
            MutationError::Configuration(msg) => assert_eq!(msg, BUCKET_NOT_CONFIGURED),
            other => panic!("Expected Configuration, got {:?}", other),
        }
        assert!(storage.signed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_bucket_wins_over_invalid_input() {
        let err = issuer(None, Arc::new(SigningStub::default()))
            .issue("", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_expiry_bounds() {
        let issuer = issuer(Some("media"), Arc::new(SigningStub::default()));
        for expires in [0, -5, MAX_PRESIGNED_EXPIRES_SECS + 1] {
            let err = issuer.issue("cat.png", Some(expires)).await.unwrap_err();
            match err {
                MutationError::Validation { field, code, .. } => {
                    assert_eq!(field.as_deref(), Some("expires"));
                    assert_eq!(code, ValidationCode::Invalid);
                }
                other => panic!("Expected Validation, got {:?}", other),
            }
        }
        assert!(issuer
            .issue("cat.png", Some(MAX_PRESIGNED_EXPIRES_SECS))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_backend_failure_passes_cause_through() {
        let storage = Arc::new(SigningStub {
            fail_with: Some("InvalidAccessKeyId".to_string()),
            ..Default::default()
        });
        let err = issuer(Some("media"), storage)
            .issue("cat.png", None)
            .await
            .unwrap_err();

        match err {
            MutationError::Backend(msg) => assert_eq!(msg, "InvalidAccessKeyId"),
            other => panic!("Expected Backend, got {:?}", other),
        }
    }
}
