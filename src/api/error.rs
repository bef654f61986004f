use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::repo::StoreError;

/// Errors returned by the wave service handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error ({public}): {source}")]
    Store {
        public: &'static str,
        #[source]
        source: StoreError,
    },

    /// Request extraction failed before the handler ran; keeps the extractor's status.
    #[error("Rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Middleware error: {0}")]
    Middleware(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    pub fn store(public: &'static str, source: StoreError) -> Self {
        ApiError::Store { public, source }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } | ApiError::Middleware(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Store { .. } | ApiError::Middleware(_) => "InternalServerError",
            ApiError::Rejected { status, .. } => match *status {
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "UnsupportedMediaType",
                StatusCode::UNPROCESSABLE_ENTITY => "UnprocessableEntity",
                StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
                _ => "BadRequest",
            },
            ApiError::Timeout => "RequestTimeout",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::Store { public, .. } => {
                tracing::error!(error = %self, "API error occurred");
                (*public).to_string()
            }
            ApiError::Middleware(_) => {
                tracing::error!(error = %self, "API error occurred");
                "⚠️ Internal server error".to_string()
            }
            ApiError::BadRequest(msg) | ApiError::Rejected { message: msg, .. } => {
                tracing::debug!(error = %self, "Client error");
                msg.clone()
            }
            ApiError::Timeout => {
                tracing::warn!("request timed out");
                "Request timed out".to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}
