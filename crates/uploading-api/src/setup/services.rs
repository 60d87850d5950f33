//! Service initialization and application state setup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uploading_core::Config;
use uploading_db::{ProductMediaRepository, ProductRepository, ThumbnailTaskRepository};
use uploading_services::{
    CreatePreSignedUrl, HttpOembedResolver, HttpRemoteMedia, MediaAttachmentService, MutationSet,
    PresignedUrlIssuer, ProductMediaCreateExtended, ProductResolver, ProviderRegistry, UrlPolicy,
};
use uploading_storage::Storage;

use crate::state::AppState;

/// Wire repositories, outbound clients and mutations into the application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let fetch_timeout = Duration::from_secs(config.http_fetch_timeout_secs());

    let url_policy = UrlPolicy::new(
        config.allow_private_media_urls(),
        config.url_upload_allowlist().map(<[String]>::to_vec),
    );
    if config.allow_private_media_urls() {
        tracing::warn!("Private network media URLs are allowed");
    }
    let remote = HttpRemoteMedia::new(
        fetch_timeout,
        url_policy,
        config.max_media_download_bytes(),
    )?;

    let mut providers =
        ProviderRegistry::with_defaults().context("Failed to compile oEmbed providers")?;
    for (pattern, endpoint) in config.oembed_extra_providers() {
        providers
            .register(pattern, endpoint)
            .with_context(|| format!("Invalid oEmbed provider pattern: {}", pattern))?;
    }
    let oembed = HttpOembedResolver::new(fetch_timeout, providers)?;

    let attachments = MediaAttachmentService::new(
        Arc::new(remote),
        Arc::new(oembed),
        storage.clone(),
        Arc::new(ProductMediaRepository::new(pool.clone())),
        Arc::new(ThumbnailTaskRepository::new(pool.clone())),
    );
    let products = ProductResolver::new(Arc::new(ProductRepository::new(pool.clone())));

    let mutations = MutationSet::new(
        CreatePreSignedUrl::new(PresignedUrlIssuer::from_config(config, storage.clone())),
        ProductMediaCreateExtended::new(products, attachments),
    );

    tracing::info!(
        fetch_timeout_secs = config.http_fetch_timeout_secs(),
        max_media_download_bytes = config.max_media_download_bytes(),
        extra_oembed_providers = config.oembed_extra_providers().len(),
        "Services initialized"
    );

    Ok(Arc::new(AppState::new(
        pool,
        storage,
        mutations,
        config.is_production(),
    )))
}
