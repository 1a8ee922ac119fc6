//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::{HealthReport, MetricsSnapshot};
use tracing::warn;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub health: HealthReport,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error type with coded responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn not_found(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<dashboard_core::Error> for ApiError {
    fn from(err: dashboard_core::Error) -> Self {
        use dashboard_core::Error;

        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = err.error_code().unwrap_or("INTERNAL");

        match &err {
            Error::EmptyDataset => ApiError::not_found(code, "No data available"),
            Error::MissingField(field) => ApiError::with_code(status, code, format!("Missing field: {}", field)),
            Error::UndefinedComparison(msg) | Error::InsufficientVariants(msg) => {
                ApiError::with_code(status, code, msg)
            }
            Error::Validation(msg) => ApiError::bad_request(msg),
            Error::Store(msg) => {
                warn!(error = %msg, "Session store unavailable");
                ApiError::with_code(status, code, "Session store unavailable")
            }
            Error::Serialization(_) | Error::Internal(_) => ApiError::internal(err.to_string()),
        }
    }
}
