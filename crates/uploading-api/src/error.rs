//! HTTP and GraphQL error conversion
//!
//! Non-GraphQL failures on the HTTP surface render as [`ErrorResponse`] through
//! [`HttpAppError`]. GraphQL resolvers turn the `MutationError`s that
//! do not belong in a mutation payload into top-level errors with an extension
//! `code`.

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uploading_core::{AppError, ErrorMetadata, LogLevel};
use uploading_services::MutationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// `AppError` rendered as an HTTP response (orphan rules: AppError lives in
/// uploading-core). In production the body never carries error details.
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub is_production: bool,
}

impl HttpAppError {
    pub fn new(error: AppError, is_production: bool) -> Self {
        Self {
            error,
            is_production,
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details only outside production, and never for sensitive errors.
        let hide_details = self.is_production || app_error.is_sensitive();
        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details: (!hide_details).then(|| app_error.detailed_message()),
            error_type: (!hide_details).then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        });

        (status, body).into_response()
    }
}

/// Top-level GraphQL error for a mutation failure that has no payload field.
///
/// Sensitive errors (storage, database) are reported as `INTERNAL_SERVER_ERROR`
/// with their generic client message.
pub fn graphql_error(err: MutationError) -> async_graphql::Error {
    let app_error = match err {
        MutationError::NotFound(msg) => AppError::NotFound(msg),
        MutationError::Network(msg) => AppError::Network(msg),
        MutationError::Internal(app) => app,
        MutationError::Configuration(msg) => AppError::Configuration(msg),
        MutationError::Backend(msg) => AppError::Storage(msg),
        MutationError::Validation { message, .. } => AppError::InvalidInput(message),
    };

    log_error(&app_error);

    let message = app_error.client_message();
    let code = if app_error.is_sensitive() {
        "INTERNAL_SERVER_ERROR"
    } else {
        app_error.error_code()
    };
    let recoverable = app_error.is_recoverable();

    async_graphql::Error::new(message).extend_with(|_, e| {
        e.set("code", code);
        e.set("recoverable", recoverable);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_body(err: HttpAppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_details_shown_outside_production() {
        let (status, body) = response_body(HttpAppError::new(
            AppError::InvalidInput("Invalid GraphQL request: missing query".into()),
            false,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(body["error"], "Invalid GraphQL request: missing query");
        assert_eq!(body["error_type"], "InvalidInput");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_production_hides_details() {
        let (status, body) = response_body(HttpAppError::new(
            AppError::InvalidInput("Invalid GraphQL request: missing query".into()),
            true,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid GraphQL request: missing query");
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
    }

    #[tokio::test]
    async fn test_sensitive_errors_hide_details_everywhere() {
        let (status, body) = response_body(HttpAppError::new(
            AppError::Storage("bucket credentials rejected".into()),
            false,
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to access storage");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_not_found_keeps_message_and_code() {
        let err = graphql_error(MutationError::NotFound(
            "Couldn't resolve to a node: abc".into(),
        ));
        assert_eq!(err.message, "Couldn't resolve to a node: abc");
        let extensions = err.extensions.expect("extensions");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("NOT_FOUND"))
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = graphql_error(MutationError::Internal(AppError::Storage(
            "bucket credentials rejected".into(),
        )));
        assert_eq!(err.message, "Failed to access storage");
        let extensions = err.extensions.expect("extensions");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("INTERNAL_SERVER_ERROR"))
        );
    }

    #[test]
    fn test_network_errors_are_recoverable() {
        let err = graphql_error(MutationError::Network("connection refused".into()));
        let extensions = err.extensions.expect("extensions");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("NETWORK_ERROR"))
        );
        assert_eq!(
            extensions.get("recoverable"),
            Some(&async_graphql::Value::from(true))
        );
    }
}
