use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::models::ErrorResponse;
use crate::pipeline::PipelineError;
use crate::validation::ValidationError;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// A request field failed validation.
    Validation(ValidationError),
    /// A categorical value the model was not trained on.
    UnknownCategory { field: String, value: String },
    /// The body could not be read as JSON.
    BadRequest(String),
    /// The body exceeds the configured limit.
    PayloadTooLarge(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::UnknownCategory { field, value } => {
                write!(f, "Validation error: {}: unknown category '{}'", field, value)
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownCategory { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a JSON body naming the
    /// offending field where there is one.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(e) => {
                tracing::warn!("Rejected request: {}", e);
                ErrorResponse {
                    error: e.to_string(),
                    field: e.field().map(str::to_string),
                }
            }
            AppError::UnknownCategory { field, value } => {
                tracing::warn!("Rejected unknown category {} for {}", value, field);
                ErrorResponse {
                    error: format!("{}: unknown category '{}'", field, value),
                    field: Some(field.clone()),
                }
            }
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Bad request: {}", msg);
                ErrorResponse {
                    error: msg.clone(),
                    field: None,
                }
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    field: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<PipelineError> for AppError {
    /// Input-caused pipeline failures are client errors; the rest means the
    /// artifact and the service disagree.
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidProfile(e) => AppError::Validation(e),
            PipelineError::UnknownCategory { column, value } => AppError::UnknownCategory {
                field: column,
                value,
            },
            other => AppError::InternalError(other.to_string()),
        }
    }
}
