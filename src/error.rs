//! Error types for catalog-import
//!
//! This module provides error handling for the library, including:
//! - The crate-wide [`Error`] type used for fatal and per-record failures
//! - [`DownloadFailure`] and [`UploadFailure`], the recoverable per-image outcomes
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for catalog-import operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog-import
///
/// Fatal precondition failures (bad arguments, unknown content type, unreadable
/// input) abort an import before any record is touched. Every other variant can
/// also surface as a per-record failure, in which case only its `Display` text
/// reaches [`crate::types::ImportResult::errors`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "import.batch_size")
        key: Option<String>,
    },

    /// Missing or invalid call arguments
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The target content type is not known to the content store
    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    /// Input file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input could not be parsed as JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Input parsed as JSON but the top-level value is not an array
    #[error("expected a JSON array of records, got {0}")]
    NotAnArray(String),

    /// The content store refused a payload
    #[error("{message}")]
    SchemaViolation {
        /// Content type the payload was written to
        content_type: String,
        /// Why the payload was refused
        message: String,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Why an image could not be retrieved
///
/// Every variant is terminal for that one image: the resolver keeps the
/// original field value and moves on.
#[derive(Debug, Error)]
pub enum DownloadFailure {
    /// The URL did not parse
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The server answered with something other than 200 OK
    #[error("unexpected HTTP status {status}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
    },

    /// The server answered 200 with an empty body
    #[error("empty response body")]
    EmptyBody,

    /// The body exceeded the configured ceiling
    #[error("image exceeds {limit} bytes")]
    TooLarge {
        /// Configured maximum in bytes
        limit: u64,
    },

    /// The declared content type is not an image type
    #[error("content type '{0}' is not an image")]
    NotAnImage(String),

    /// The request did not complete within the configured timeout
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, TLS, or body read failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Why an asset could not be placed in the media library
#[derive(Debug, Error)]
pub enum UploadFailure {
    /// The descriptor is missing a filename, MIME type, or payload
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// The asset bytes could not be staged on disk
    #[error("failed to stage asset: {0}")]
    Staging(String),

    /// The primary media store failed and no fallback is configured
    #[error("media store rejected upload: {0}")]
    Primary(String),

    /// The fallback HTTP upload failed
    #[error("fallback upload failed: {0}")]
    Fallback(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "unknown_content_type",
///     "message": "unknown content type: api::article.article"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_input")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - precondition failures the caller can fix
            Error::Config { .. } => 400,
            Error::InvalidInput(_) => 400,
            Error::InvalidJson(_) => 400,
            Error::NotAnArray(_) => 400,

            // 404 Not Found
            Error::UnknownContentType(_) => 404,
            Error::FileNotFound(_) => 404,

            // 422 Unprocessable Entity - store refused the payload
            Error::SchemaViolation { .. } => 422,

            // 500 Internal Server Error
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - external service errors
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidInput(_) => "invalid_input",
            Error::UnknownContentType(_) => "unknown_content_type",
            Error::FileNotFound(_) => "file_not_found",
            Error::InvalidJson(_) => "invalid_json",
            Error::NotAnArray(_) => "not_an_array",
            Error::SchemaViolation { .. } => "schema_violation",
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::UnknownContentType(content_type) => Some(serde_json::json!({
                "content_type": content_type,
            })),
            Error::FileNotFound(path) => Some(serde_json::json!({
                "path": path,
            })),
            Error::SchemaViolation { content_type, .. } => Some(serde_json::json!({
                "content_type": content_type,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
