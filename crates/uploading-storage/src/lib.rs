//! Uploading Storage Library
//!
//! This crate provides the storage abstraction for product media and signed
//! upload grants, with implementations for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Product images are stored under `products/{filename}`. Keys for signed upload
//! grants are the caller-supplied object names, used verbatim.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use uploading_core::StorageBackend;
