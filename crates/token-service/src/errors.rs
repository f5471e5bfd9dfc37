//! Token Service error types.
//!
//! All errors map to an HTTP status code and a `{"error": "..."}` body via
//! the `IntoResponse` impl. Configuration and internal failures are logged
//! server-side; the client only sees a fixed message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::types::ErrorResponse;
use thiserror::Error;

/// Client-facing message for a missing channel name.
pub const CHANNEL_REQUIRED: &str = "Channel name required";

/// Client-facing message for a missing or malformed uid.
pub const UID_REQUIRED: &str = "UID required";

/// Client-facing message for missing signing credentials.
pub const CREDENTIALS_MISSING: &str = "Missing Agora App ID / Certificate";

/// Client-facing message for a signing failure.
pub const TOKEN_GENERATION_FAILED: &str = "Failed to generate token";

/// Token Service error type.
///
/// Maps to HTTP status codes:
/// - Validation: 400 Bad Request
/// - Configuration, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum TokenServiceError {
    /// Missing or malformed request input. The message is returned verbatim.
    #[error("Validation error: {0}")]
    Validation(&'static str),

    /// Deployment misconfiguration. Holds the missing variable name.
    #[error("Configuration error: {0} is not set")]
    Configuration(&'static str),

    /// Unexpected failure while signing.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TokenServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TokenServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            TokenServiceError::Configuration(_) | TokenServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Bounded label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenServiceError::Validation(_) => "validation",
            TokenServiceError::Configuration(_) => "configuration",
            TokenServiceError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for TokenServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            TokenServiceError::Validation(message) => *message,
            TokenServiceError::Configuration(var) => {
                tracing::error!(target: "token.config", missing = %var, "Signing credentials are not configured");
                CREDENTIALS_MISSING
            }
            TokenServiceError::Internal(err) => {
                tracing::error!(target: "token.signing", error = %err, "Token generation failed");
                TOKEN_GENERATION_FAILED
            }
        };

        let body = ErrorResponse {
            error: message.to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TokenServiceError::Validation(CHANNEL_REQUIRED).to_string(),
            "Validation error: Channel name required"
        );
        assert_eq!(
            TokenServiceError::Configuration("AGORA_APP_ID").to_string(),
            "Configuration error: AGORA_APP_ID is not set"
        );
        assert_eq!(
            TokenServiceError::Internal("string too long".to_string()).to_string(),
            "Internal error: string too long"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TokenServiceError::Validation(UID_REQUIRED).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TokenServiceError::Configuration("AGORA_APP_ID").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TokenServiceError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_into_response_validation_returns_message() {
        let response = TokenServiceError::Validation(CHANNEL_REQUIRED).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body, serde_json::json!({ "error": "Channel name required" }));
    }

    #[tokio::test]
    async fn test_into_response_configuration_hides_variable_name() {
        let response = TokenServiceError::Configuration("AGORA_APP_CERTIFICATE").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"], CREDENTIALS_MISSING);
    }

    #[tokio::test]
    async fn test_into_response_internal_is_generic() {
        let response =
            TokenServiceError::Internal("channel name exceeds 65535 bytes".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"], "Failed to generate token");
    }
}
