//! Outbound HTTP access to caller-supplied media URLs.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Method, Response, Url};
use std::time::Duration;
use uploading_core::constants::MEDIA_PROBE_USER_AGENT;
use uploading_core::AppError;

use crate::error::MutationError;
use crate::url_guard::UrlPolicy;

const MAX_REDIRECTS: usize = 5;

/// Body and declared content type of a downloaded media file.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Remote media host, probed with HEAD and downloaded with GET.
#[async_trait]
pub trait RemoteMedia: Send + Sync {
    /// `Content-Type` reported by a HEAD request, `None` when the header is absent.
    async fn probe_content_type(&self, url: &str) -> Result<Option<String>, MutationError>;

    async fn fetch(&self, url: &str) -> Result<FetchedMedia, MutationError>;
}

/// reqwest-backed [`RemoteMedia`] with SSRF checks, a timeout and a size cap.
#[derive(Clone)]
pub struct HttpRemoteMedia {
    client: reqwest::Client,
    policy: UrlPolicy,
    max_download_bytes: usize,
}

impl HttpRemoteMedia {
    pub fn new(
        timeout: Duration,
        policy: UrlPolicy,
        max_download_bytes: usize,
    ) -> Result<Self, AppError> {
        // Redirects are followed in `send` so every hop passes the URL policy.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy,
            max_download_bytes,
        })
    }

    async fn check_url(&self, url: &str) -> Result<(), MutationError> {
        self.policy.validate(url).await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Media URL rejected");
            MutationError::invalid_media_url(format!("URL validation failed: {}", e))
        })
    }

    /// Send `method` to `url`, following up to [`MAX_REDIRECTS`] redirects.
    /// Every hop, the first included, passes the URL policy before it is contacted.
    async fn send(&self, method: Method, url: &str) -> Result<Response, MutationError> {
        self.check_url(url).await?;

        let mut current = url.to_string();
        let mut hops = 0;
        loop {
            let response = self
                .client
                .request(method.clone(), &current)
                .header(USER_AGENT, MEDIA_PROBE_USER_AGENT)
                .send()
                .await
                .map_err(|e| {
                    tracing::warn!(
                        error = %e,
                        url = %current,
                        method = %method,
                        "Media request failed"
                    );
                    MutationError::Network(format!("Failed to reach media URL: {}", e))
                })?;

            let next = match redirect_target(&response) {
                Some(next) => next,
                None => return Ok(response),
            };
            if hops == MAX_REDIRECTS {
                return Err(MutationError::Network(format!(
                    "Too many redirects (more than {})",
                    MAX_REDIRECTS
                )));
            }
            hops += 1;

            self.check_url(next.as_str()).await?;
            tracing::debug!(from = %current, to = %next, "Following redirect");
            current = next.into();
        }
    }

    fn too_large(&self) -> MutationError {
        MutationError::invalid_media_url(format!(
            "Media exceeds the maximum size of {} bytes",
            self.max_download_bytes
        ))
    }
}

#[async_trait]
impl RemoteMedia for HttpRemoteMedia {
    #[tracing::instrument(skip(self))]
    async fn probe_content_type(&self, url: &str) -> Result<Option<String>, MutationError> {
        let response = self.send(Method::HEAD, url).await?;

        if !response.status().is_success() {
            return Err(MutationError::Network(format!(
                "Media URL returned status code: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        tracing::debug!(content_type = ?content_type, "Media probe completed");
        Ok(content_type)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, MutationError> {
        let mut response = self.send(Method::GET, url).await?;

        if !response.status().is_success() {
            return Err(MutationError::Network(format!(
                "URL returned status code: {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_download_bytes as u64 {
                return Err(self.too_large());
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(';').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MutationError::Network(format!("Failed to read response body: {}", e)))?
        {
            if data.len() + chunk.len() > self.max_download_bytes {
                return Err(self.too_large());
            }
            data.extend_from_slice(&chunk);
        }

        tracing::info!(size_bytes = data.len(), content_type = ?content_type, "Media downloaded");

        Ok(FetchedMedia { data, content_type })
    }
}

/// Absolute target of a redirect response, `None` for anything else.
fn redirect_target(response: &Response) -> Option<Url> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}
