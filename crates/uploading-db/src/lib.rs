//! Database access for the uploading plugin
//!
//! The product and product media tables belong to the host platform; this crate
//! only reads products, appends media rows and enqueues thumbnail tasks. The
//! collaborator traits in [`traits`] let services run against in-memory fakes.

pub mod db;
pub mod traits;

pub use db::{
    ProductMediaRepository, ProductRepository, ThumbnailTaskRepository, THUMBNAIL_NOTIFY_CHANNEL,
};
pub use traits::{MediaAssetStore, ProductLookup, ThumbnailScheduler};
