use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::UpstreamError;
use std::fmt;
use tracing::error;

/// Error type for the HTTP surface
#[derive(Debug)]
pub enum ApiError {
    // Upstream API errors
    Upstream(UpstreamError),

    // Proxy transport errors
    Proxy(String),

    // Validation errors
    ValidationError(String),

    // Internal errors
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Upstream(err) => write!(f, "Upstream error: {}", err),
            ApiError::Proxy(msg) => write!(f, "Proxy error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response structure for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

/// Body the proxy answers with when the upstream cannot be reached.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            ApiError::Upstream(err) => {
                error!("Upstream error: {}", err);
                let details = serde_json::json!({
                    "service": err.service(),
                    "status": err.status(),
                });
                (StatusCode::BAD_GATEWAY, "upstream_error", err.to_string(), Some(details))
            }
            ApiError::Proxy(msg) => {
                error!("Proxy error: {}", msg);
                let body = ProxyErrorResponse {
                    error: "Proxy error".to_string(),
                    message: msg.clone(),
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone(), None)
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Proxy(err.to_string())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
