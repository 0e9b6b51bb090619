//! Error types for media-vault
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Ingest, Database, Config, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-vault
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "storage.root")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Site bundle ingestion error (extraction, entry location)
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Rejected upload (missing file, bad flag value, empty filename)
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Asset or category not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation conflicts with the asset's current processing state
    #[error("cannot {operation} asset {id} in state {state}")]
    InvalidState {
        /// The asset ID the operation was attempted on
        id: i64,
        /// The operation that was attempted (e.g., "retry")
        operation: String,
        /// The current processing state that prevents the operation
        state: String,
    },

    /// Shutdown in progress - not accepting new uploads or jobs
    #[error("shutdown in progress: not accepting new work")]
    ShuttingDown,

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

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., duplicate slug)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Site bundle ingestion errors (extraction and entry location)
///
/// These are the failures the orchestrator converts into a persisted `failed`
/// state; they never propagate out of a background job.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Archive could not be opened or parsed
    #[error("corrupt archive {archive}: {reason}")]
    CorruptArchive {
        /// The archive file that failed to open or parse
        archive: PathBuf,
        /// The underlying parse failure
        reason: String,
    },

    /// Archive contains an entry that would escape the extraction sandbox
    #[error("unsafe entry {entry:?} in archive {archive}")]
    UnsafeArchiveEntry {
        /// The archive containing the offending entry
        archive: PathBuf,
        /// The raw entry name as stored in the archive
        entry: String,
    },

    /// Archive exceeds the configured decompressed-size or entry-count ceiling
    #[error("archive {archive} too large: {reason}")]
    ArchiveTooLarge {
        /// The archive that tripped the ceiling
        archive: PathBuf,
        /// Which ceiling was exceeded and by how much
        reason: String,
    },

    /// The uploaded archive blob is missing on disk
    #[error("source archive missing: {path}")]
    SourceMissing {
        /// The path where the archive was expected
        path: PathBuf,
    },
}

/// API error response format
///
/// Returned by API endpoints when an error occurs, with a machine-readable
/// code and a human-readable message.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "asset 123 not found"
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
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a "conflict" error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
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
            // 400 Bad Request - client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidUpload(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict - operation invalid for current state
            Error::InvalidState { .. } => 409,

            // 422 Unprocessable Entity - semantically invalid archives
            Error::Ingest(_) => 422,

            // 500 Internal Server Error
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Ingest(e) => match e {
                IngestError::CorruptArchive { .. } => "corrupt_archive",
                IngestError::UnsafeArchiveEntry { .. } => "unsafe_archive_entry",
                IngestError::ArchiveTooLarge { .. } => "archive_too_large",
                IngestError::SourceMissing { .. } => "source_missing",
            },
            Error::InvalidUpload(_) => "validation_error",
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::InvalidState { .. } => "invalid_state",
            Error::ShuttingDown => "shutting_down",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::new(error.error_code().to_string(), error.to_string())
    }
}
