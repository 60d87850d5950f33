//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use uploading_core::Config;
use uploading_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        bucket = config.media_bucket_name().unwrap_or("<unset>"),
        "Storage initialized"
    );
    if config.media_bucket_name().is_none() {
        tracing::warn!("No media bucket configured; createPreSignedUrl will return an error");
    }
    Ok(storage)
}
