// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for import, query and admin paths

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every failure the service can report
/// Each variant maps to an HTTP status code and a stable error code
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Place already exists: {0}")]
    AlreadyExists(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No JSON files found in directory: {0}")]
    NoDocumentsFound(String),

    #[error("Failed to fetch document: {0}")]
    FetchError(String),

    #[error("Failed to fetch image {url}: {reason}")]
    ImageFetchError { url: String, reason: String },

    #[error("Media storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized access")]
    Unauthorized,
}

impl PlacesError {
    fn error_code(&self) -> &'static str {
        match self {
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::AlreadyExists(_) => "ALREADY_EXISTS",
            PlacesError::MissingField(_) => "MISSING_FIELD",
            PlacesError::MalformedJson(_) => "MALFORMED_JSON",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::NoDocumentsFound(_) => "NO_DOCUMENTS_FOUND",
            PlacesError::FetchError(_) => "FETCH_ERROR",
            PlacesError::ImageFetchError { .. } => "IMAGE_FETCH_ERROR",
            PlacesError::StorageError(_) => "STORAGE_ERROR",
            PlacesError::DatabaseError(_) => "DATABASE_ERROR",
            PlacesError::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl From<sqlx::Error> for PlacesError {
    fn from(e: sqlx::Error) -> Self {
        PlacesError::DatabaseError(e.to_string())
    }
}

impl From<validator::ValidationErrors> for PlacesError {
    fn from(e: validator::ValidationErrors) -> Self {
        PlacesError::ValidationError(e.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::AlreadyExists(_) => StatusCode::CONFLICT,
            PlacesError::MissingField(_)
            | PlacesError::MalformedJson(_)
            | PlacesError::ValidationError(_)
            | PlacesError::InvalidInput(_)
            | PlacesError::NoDocumentsFound(_) => StatusCode::BAD_REQUEST,
            PlacesError::FetchError(_) | PlacesError::ImageFetchError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            PlacesError::StorageError(_) | PlacesError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PlacesError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}
