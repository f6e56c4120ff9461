//! HTTP mapping for `SpendError`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::{FieldError, SpendError};

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl SpendError {
    /// The HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            SpendError::Validation(_)
            | SpendError::InvalidFields(_)
            | SpendError::ExportLimit { .. } => StatusCode::BAD_REQUEST,
            SpendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SpendError::Forbidden(_) => StatusCode::FORBIDDEN,
            SpendError::NotFound { .. } => StatusCode::NOT_FOUND,
            SpendError::Duplicate { .. } => StatusCode::CONFLICT,
            SpendError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            SpendError::Config(_)
            | SpendError::Io(_)
            | SpendError::Json(_)
            | SpendError::Export(_)
            | SpendError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SpendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            SpendError::InvalidFields(details) => ErrorBody {
                error: "Validation failed".to_string(),
                details,
            },
            SpendError::Storage(ref msg) => {
                error!(status = status.as_u16(), "storage unavailable: {msg}");
                ErrorBody {
                    error: "Service temporarily unavailable".to_string(),
                    details: Vec::new(),
                }
            }
            other if status.is_server_error() => {
                error!(status = status.as_u16(), "request failed: {other}");
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: Vec::new(),
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                details: Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
