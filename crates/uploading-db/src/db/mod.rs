//! Postgres repositories
//!
//! Queries use dynamic `sqlx::query` so builds do not need a live database.

mod product;
mod product_media;
mod thumbnail_task;

pub use product::ProductRepository;
pub use product_media::ProductMediaRepository;
pub use thumbnail_task::{ThumbnailTaskRepository, THUMBNAIL_NOTIFY_CHANNEL};
