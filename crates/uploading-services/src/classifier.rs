//! Media classification: does a URL point at an image to download, or at
//! something to reference through oEmbed?

use std::sync::Arc;

use crate::error::MutationError;
use crate::naming::has_image_extension;
use crate::remote::RemoteMedia;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    External,
}

/// Two-stage classifier: HEAD probe first, then the URL's file extension.
///
/// A probe that fails outright is an error; only a reachable, non-image answer
/// (or one without a content type) falls through to the extension check.
#[derive(Clone)]
pub struct MediaClassifier {
    remote: Arc<dyn RemoteMedia>,
}

impl MediaClassifier {
    pub fn new(remote: Arc<dyn RemoteMedia>) -> Self {
        Self { remote }
    }

    #[tracing::instrument(skip(self))]
    pub async fn classify(&self, url: &str) -> Result<MediaClass, MutationError> {
        let content_type = self.remote.probe_content_type(url).await?;

        let class = if content_type
            .as_deref()
            .map(|ct| ct.to_lowercase().contains("image"))
            .unwrap_or(false)
            || has_image_extension(url)
        {
            MediaClass::Image
        } else {
            MediaClass::External
        };

        tracing::debug!(content_type = ?content_type, class = ?class, "Media URL classified");
        Ok(class)
    }
}
