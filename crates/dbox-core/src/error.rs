//! Unified application error types for DBox.
//!
//! Every store implementation maps its native errors (sqlx, the S3 SDK,
//! `std::io`) into [`AppError`] so that the coordinator and its callers see
//! one typed failure regardless of which backend produced it.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A file or folder identifier does not resolve in the metadata store.
    NotFound,
    /// The object store has no object under the requested key.
    ObjectNotFound,
    /// Writing or copying a blob failed (or timed out).
    ObjectStoreWriteFailed,
    /// Reading a blob failed (or timed out).
    ObjectStoreReadFailed,
    /// Deleting a blob failed (or timed out).
    ObjectStoreDeleteFailed,
    /// Reading from the metadata store failed.
    MetadataReadFailed,
    /// Writing to the metadata store failed.
    MetadataWriteFailed,
    /// Input validation failed.
    Validation,
    /// The target name or key is already taken.
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound | Self::ObjectNotFound => 404,
            Self::Validation => 400,
            Self::Conflict => 409,
            Self::ObjectStoreWriteFailed
            | Self::ObjectStoreReadFailed
            | Self::ObjectStoreDeleteFailed => 502,
            Self::MetadataReadFailed | Self::MetadataWriteFailed => 503,
            Self::Configuration | Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::ObjectNotFound => write!(f, "OBJECT_NOT_FOUND"),
            Self::ObjectStoreWriteFailed => write!(f, "OBJECT_STORE_WRITE_FAILED"),
            Self::ObjectStoreReadFailed => write!(f, "OBJECT_STORE_READ_FAILED"),
            Self::ObjectStoreDeleteFailed => write!(f, "OBJECT_STORE_DELETE_FAILED"),
            Self::MetadataReadFailed => write!(f, "METADATA_READ_FAILED"),
            Self::MetadataWriteFailed => write!(f, "METADATA_WRITE_FAILED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DBox.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Re-tag this error with another kind, keeping message and cause.
    pub fn into_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create a not-found error for a metadata identifier.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an error for a missing object-store key.
    pub fn object_not_found(key: &str) -> Self {
        Self::new(ErrorKind::ObjectNotFound, format!("Object not found: {key}"))
    }

    /// Create an object-store write error.
    pub fn object_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ObjectStoreWriteFailed, message)
    }

    /// Create an object-store read error.
    pub fn object_read(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ObjectStoreReadFailed, message)
    }

    /// Create an object-store delete error.
    pub fn object_delete(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ObjectStoreDeleteFailed, message)
    }

    /// Create a metadata read error.
    pub fn metadata_read(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MetadataReadFailed, message)
    }

    /// Create a metadata write error.
    pub fn metadata_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MetadataWriteFailed, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::ObjectNotFound
        } else {
            ErrorKind::Internal
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::object_write("put failed");
        assert_eq!(err.to_string(), "OBJECT_STORE_WRITE_FAILED: put failed");
    }

    #[test]
    fn test_into_kind_keeps_message() {
        let err = AppError::internal("timed out").into_kind(ErrorKind::ObjectStoreDeleteFailed);
        assert!(err.is(ErrorKind::ObjectStoreDeleteFailed));
        assert_eq!(err.message, "timed out");
    }

    #[test]
    fn test_io_not_found_maps_to_object_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::ObjectStoreReadFailed.http_status(), 502);
    }
}
