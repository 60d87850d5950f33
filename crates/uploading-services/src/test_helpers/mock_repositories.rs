//! Mock repository implementations for testing
//!
//! These mocks allow testing mutations without database dependencies.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uploading_core::models::{
    MediaAsset, NewMediaAsset, Product, TaskStatus, ThumbnailTask,
};
use uploading_core::AppError;
use uploading_db::{MediaAssetStore, ProductLookup, ThumbnailScheduler};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockProductLookup {
    products: Arc<Mutex<HashMap<i32, Product>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockProductLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id, product);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductLookup for MockProductLookup {
    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.lock().unwrap().get(&product_id).cloned())
    }
}

/// Media store appending to a vector, with per-product sort order.
#[derive(Clone, Default)]
pub struct MockMediaStore {
    media: Arc<Mutex<Vec<MediaAsset>>>,
    fail: Arc<AtomicBool>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<MediaAsset> {
        self.media.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaAssetStore for MockMediaStore {
    async fn create_media(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("mock insert failure".to_string()));
        }
        let mut stored = self.media.lock().unwrap();
        let sort_order = stored
            .iter()
            .filter(|m| m.product_id == media.product_id)
            .count() as i32;
        let asset = MediaAsset {
            id: stored.len() as i32 + 1,
            product_id: media.product_id,
            alt: media.alt,
            sort_order: Some(sort_order),
            kind: media.kind,
        };
        stored.push(asset.clone());
        Ok(asset)
    }
}

#[derive(Clone, Default)]
pub struct MockThumbnailScheduler {
    scheduled: Arc<Mutex<Vec<ThumbnailTask>>>,
    fail: Arc<AtomicBool>,
}

impl MockThumbnailScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_scheduling(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn scheduled_media_ids(&self) -> Vec<i32> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .map(|task| task.media_id)
            .collect()
    }
}

#[async_trait]
impl ThumbnailScheduler for MockThumbnailScheduler {
    async fn schedule_thumbnail(&self, media_id: i32) -> Result<ThumbnailTask, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("mock queue unavailable".to_string()));
        }
        let task = ThumbnailTask {
            id: Uuid::new_v4(),
            media_id,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        };
        self.scheduled.lock().unwrap().push(task.clone());
        Ok(task)
    }
}
