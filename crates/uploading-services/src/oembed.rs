//! oEmbed resolution for media that is referenced rather than stored.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::time::Duration;
use uploading_core::models::ProductMediaType;
use uploading_core::AppError;

use crate::error::MutationError;

const UNSUPPORTED_PROVIDER: &str = "Unsupported media provider or incorrect URL.";

/// Built-in providers: (URL pattern, oEmbed endpoint).
const DEFAULT_PROVIDERS: &[(&str, &str)] = &[
    (
        r"^https?://(?:www\.|m\.)?youtube\.com/(?:watch|shorts/|embed/).+",
        "https://www.youtube.com/oembed",
    ),
    (r"^https?://youtu\.be/.+", "https://www.youtube.com/oembed"),
    (
        r"^https?://(?:www\.|player\.)?vimeo\.com/.+",
        "https://vimeo.com/api/oembed.json",
    ),
    (
        r"^https?://(?:www\.)?flickr\.com/photos/.+",
        "https://www.flickr.com/services/oembed/",
    ),
    (r"^https?://flic\.kr/.+", "https://www.flickr.com/services/oembed/"),
    (
        r"^https?://(?:www\.)?dailymotion\.com/video/.+",
        "https://www.dailymotion.com/services/oembed",
    ),
    (
        r"^https?://(?:www\.)?soundcloud\.com/.+",
        "https://soundcloud.com/oembed",
    ),
    (
        r"^https?://open\.spotify\.com/.+",
        "https://open.spotify.com/oembed",
    ),
];

/// Resolved oEmbed document.
#[derive(Debug, Clone, PartialEq)]
pub struct OembedData {
    /// Canonical media URL; the requested URL when the provider omits it.
    pub url: String,
    pub title: Option<String>,
    pub media_type: ProductMediaType,
    /// Provider response as received, with `url` filled in.
    pub raw: JsonValue,
}

impl OembedData {
    /// Validate a provider response for `requested_url`.
    pub fn from_response(requested_url: &str, mut raw: JsonValue) -> Result<Self, MutationError> {
        let object = raw
            .as_object_mut()
            .ok_or_else(|| MutationError::invalid_media_url(UNSUPPORTED_PROVIDER))?;

        let media_type = object
            .get("type")
            .and_then(JsonValue::as_str)
            .and_then(ProductMediaType::from_oembed_type)
            .ok_or_else(|| MutationError::invalid_media_url(UNSUPPORTED_PROVIDER))?;

        let url = match object.get("url").and_then(JsonValue::as_str) {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => {
                object.insert(
                    "url".to_string(),
                    JsonValue::String(requested_url.to_string()),
                );
                requested_url.to_string()
            }
        };

        let title = object
            .get("title")
            .and_then(JsonValue::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Ok(Self {
            url,
            title,
            media_type,
            raw,
        })
    }
}

#[derive(Debug, Clone)]
struct Provider {
    pattern: Regex,
    endpoint: String,
}

/// Ordered URL pattern to oEmbed endpoint table. First match wins.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Result<Self, regex::Error> {
        let mut registry = Self::empty();
        for (pattern, endpoint) in DEFAULT_PROVIDERS {
            registry.register(pattern, endpoint)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, pattern: &str, endpoint: &str) -> Result<(), regex::Error> {
        self.providers.push(Provider {
            pattern: Regex::new(pattern)?,
            endpoint: endpoint.to_string(),
        });
        Ok(())
    }

    pub fn endpoint_for(&self, url: &str) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| p.pattern.is_match(url))
            .map(|p| p.endpoint.as_str())
    }
}

#[async_trait]
pub trait OembedResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<OembedData, MutationError>;
}

/// Queries the matching provider's oEmbed endpoint over HTTP.
#[derive(Clone)]
pub struct HttpOembedResolver {
    client: reqwest::Client,
    registry: ProviderRegistry,
}

impl HttpOembedResolver {
    pub fn new(timeout: Duration, registry: ProviderRegistry) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, registry })
    }
}

#[async_trait]
impl OembedResolver for HttpOembedResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, url: &str) -> Result<OembedData, MutationError> {
        let endpoint = self.registry.endpoint_for(url).ok_or_else(|| {
            tracing::debug!(url = %url, "No oEmbed provider matches URL");
            MutationError::invalid_media_url(UNSUPPORTED_PROVIDER)
        })?;

        let response = self
            .client
            .get(endpoint)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, endpoint = %endpoint, "oEmbed request failed");
                MutationError::Network(format!("Failed to reach oEmbed provider: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), endpoint = %endpoint, "oEmbed provider rejected URL");
            return Err(MutationError::invalid_media_url(UNSUPPORTED_PROVIDER));
        }

        let raw: JsonValue = response
            .json()
            .await
            .map_err(|_| MutationError::invalid_media_url(UNSUPPORTED_PROVIDER))?;

        OembedData::from_response(url, raw)
    }
}
