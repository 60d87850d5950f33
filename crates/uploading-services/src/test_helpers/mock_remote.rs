//! Mock remote media host and oEmbed provider

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::MutationError;
use crate::oembed::{OembedData, OembedResolver};
use crate::remote::{FetchedMedia, RemoteMedia};

/// Answers every probe and download with the same content type and body.
#[derive(Clone, Default)]
pub struct MockRemoteMedia {
    content_type: Option<String>,
    body: Vec<u8>,
    unreachable: bool,
    probes: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
}

impl MockRemoteMedia {
    pub fn serving(content_type: &str, body: &[u8]) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            body: body.to_vec(),
            ..Default::default()
        }
    }

    pub fn without_content_type() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Total HEAD and GET requests made.
    pub fn request_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst) + self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteMedia for MockRemoteMedia {
    async fn probe_content_type(&self, _url: &str) -> Result<Option<String>, MutationError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(MutationError::Network(
                "Failed to reach media URL: connection refused".to_string(),
            ));
        }
        Ok(self.content_type.clone())
    }

    async fn fetch(&self, _url: &str) -> Result<FetchedMedia, MutationError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(MutationError::Network(
                "Failed to download from URL: connection refused".to_string(),
            ));
        }
        Ok(FetchedMedia {
            data: self.body.clone(),
            content_type: self.content_type.clone(),
        })
    }
}

/// Resolves every URL to a video with the configured title.
#[derive(Clone, Default)]
pub struct MockOembedResolver {
    title: Option<String>,
    unsupported: bool,
    calls: Arc<AtomicUsize>,
}

impl MockOembedResolver {
    pub fn video(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn untitled_video() -> Self {
        Self::default()
    }

    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OembedResolver for MockOembedResolver {
    async fn resolve(&self, url: &str) -> Result<OembedData, MutationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unsupported {
            return Err(MutationError::invalid_media_url(
                "Unsupported media provider or incorrect URL.",
            ));
        }
        let mut raw = json!({
            "type": "video",
            "provider_name": "YouTube",
            "html": "<iframe></iframe>",
        });
        if let Some(title) = &self.title {
            raw["title"] = json!(title);
        }
        OembedData::from_response(url, raw)
    }
}
