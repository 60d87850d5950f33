//! Mutation-level errors
//!
//! `Configuration`, `Backend` and `Validation` end up as payload errors on the
//! mutation result; the rest surface as top-level GraphQL errors.

use uploading_core::{AppError, GlobalIdError};
use uploading_storage::StorageError;

/// Field error codes shared by both mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// Signed upload grant rejected (`PreSignedErrorCode.INVALID`).
    Invalid,
    InvalidFieldValue,
    Required,
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("{0}")]
    Configuration(String),

    /// Signing backend failure; the message is the backend's own.
    #[error("{0}")]
    Backend(String),

    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
        code: ValidationCode,
    },

    #[error("{0}")]
    NotFound(String),

    /// Remote host unreachable or answered with a non-success status.
    #[error("{0}")]
    Network(String),

    #[error(transparent)]
    Internal(#[from] AppError),
}

impl MutationError {
    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        code: ValidationCode,
    ) -> Self {
        MutationError::Validation {
            field: Some(field.into()),
            message: message.into(),
            code,
        }
    }

    pub fn invalid_media_url(message: impl Into<String>) -> Self {
        Self::validation("mediaUrl", message, ValidationCode::InvalidFieldValue)
    }

    /// Whether this error belongs in the mutation payload rather than the top-level errors.
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            MutationError::Configuration(_)
                | MutationError::Backend(_)
                | MutationError::Validation { .. }
        )
    }
}

impl From<StorageError> for MutationError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            other => AppError::Storage(other.to_string()),
        };
        MutationError::Internal(app)
    }
}

impl From<GlobalIdError> for MutationError {
    fn from(err: GlobalIdError) -> Self {
        Self::validation(
            "productExtend",
            err.to_string(),
            ValidationCode::InvalidFieldValue,
        )
    }
}
