//! Error types for the PDF Extraction API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Upload rejected before any extraction work
    #[error("{0}")]
    InvalidInput(String),

    /// Document could not be opened or processed
    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::InvalidInput(msg) => {
                tracing::debug!("Rejected upload: {}", msg);
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            AppError::Document(e) => {
                tracing::error!("Document error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "document_error")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = Json(ErrorResponse {
            error: error_type,
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
