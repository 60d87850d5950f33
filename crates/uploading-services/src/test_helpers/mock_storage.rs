//! Mock storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uploading_storage::{Storage, StorageBackend, StorageError, StorageResult};

/// In-memory storage that records uploads and signed URLs.
#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    signed: Arc<Mutex<Vec<(String, Duration)>>>,
    signing_error: Arc<Mutex<Option<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent signing call fail with `cause`.
    pub fn fail_signing_with(&self, cause: &str) {
        *self.signing_error.lock().unwrap() = Some(cause.to_string());
    }

    pub fn file(&self, storage_key: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, storage_key: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .map(|(_, ct)| ct.clone())
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn signed_requests(&self) -> Vec<(String, Duration)> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.files.lock().unwrap().insert(
            storage_key.to_string(),
            (data, content_type.to_string()),
        );
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.files
            .lock()
            .unwrap()
            .remove(storage_key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if let Some(cause) = self.signing_error.lock().unwrap().clone() {
            return Err(StorageError::BackendError(cause));
        }
        self.signed
            .lock()
            .unwrap()
            .push((storage_key.to_string(), expires_in));
        Ok(format!(
            "https://mock-bucket.s3.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=mock",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://mock-bucket.s3.amazonaws.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
