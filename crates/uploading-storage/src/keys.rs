//! Shared key generation for storage backends.
//!
//! Key format: `products/{filename}`.

use crate::traits::{StorageError, StorageResult};
use uploading_core::constants::PRODUCT_MEDIA_PREFIX;

/// Generate the storage key for a product image filename.
pub fn product_media_key(filename: &str) -> String {
    format!("{}/{}", PRODUCT_MEDIA_PREFIX, filename)
}

/// Reject keys that could escape the bucket or storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey(
            "Storage key must not be empty".to_string(),
        ));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_media_key() {
        assert_eq!(
            product_media_key("cat_0a1b2c3d.png"),
            "products/cat_0a1b2c3d.png"
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("products/cat.png").is_ok());
        assert!(validate_key("uploads/2024/report.pdf").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("products/../secret").is_err());
    }
}
