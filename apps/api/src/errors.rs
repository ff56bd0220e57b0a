use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::models::{InvalidTopK, PipelineError};
use crate::matching::runs::RunError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The run was rejected before any resume was scored.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PipelineError),

    #[error("Too many runs: {0}")]
    TooManyRuns(String),
}

impl From<RunError> for AppError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Rejected(e) => AppError::Precondition(e),
            err @ RunError::AtCapacity { .. } => AppError::TooManyRuns(err.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart body: {e}"))
    }
}

impl From<InvalidTopK> for AppError {
    fn from(e: InvalidTopK) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Precondition(e) => (
                StatusCode::BAD_REQUEST,
                "PRECONDITION_FAILED",
                e.to_string(),
            ),
            AppError::TooManyRuns(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_RUNS", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_capacity_maps_to_too_many_requests() {
        let response = AppError::from(RunError::AtCapacity { limit: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_rejected_run_maps_to_precondition() {
        let response =
            AppError::from(RunError::Rejected(PipelineError::NoCandidates)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
