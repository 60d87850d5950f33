//! Uploading Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the uploading plugin crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod global_id;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadingConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use global_id::{GlobalId, GlobalIdError};
pub use storage_types::StorageBackend;
