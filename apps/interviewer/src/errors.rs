use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// LLM failures are deliberately absent: the prompt composer degrades them to
/// canned text, so they never reach a caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No text could be extracted from the uploaded document")]
    ExtractionEmpty,

    #[error("Invalid phase transition: {0}")]
    InvalidPhase(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session {id} not found"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ExtractionEmpty => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_EMPTY",
                "Failed to extract text from resume".to_string(),
            ),
            AppError::InvalidPhase(msg) => {
                tracing::error!("Invalid phase transition: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_PHASE",
                    "The interview reached an inconsistent state".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
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
