//! Error types for globalforms.
//!
//! This module defines all error types used throughout the globalforms crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::forms::{FieldErrors, FormKind};

/// The main error type for globalforms operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Request Errors ===
    /// The form slug does not name a known form kind.
    #[error("unknown form kind: {0}")]
    UnknownKind(String),

    /// No request of this kind exists with the given id.
    #[error("{} request not found", kind.program())]
    NotFound {
        /// Kind the lookup was scoped to.
        kind: FormKind,
        /// Requested record id.
        id: i64,
    },

    /// A submission failed field validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The request body could not be read as the expected form.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// An attached file was rejected.
    #[error("upload rejected for field '{field}': {message}")]
    Upload {
        /// Multipart field name of the file.
        field: String,
        /// Why the file was rejected.
        message: String,
    },

    // === Client Errors ===
    /// The HTTP transport failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// The `detail` message from the response body.
        detail: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for globalforms operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new malformed payload error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Create an upload rejection for a file field.
    #[must_use]
    pub fn upload(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upload {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownKind(_))
    }

    /// Check if this error carries field validation messages.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error was caused by what the caller sent.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedPayload(_) | Self::Upload { .. })
    }

    /// The field errors, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_uses_program_label() {
        let err = Error::NotFound {
            kind: FormKind::ExitForm,
            id: 7,
        };
        assert_eq!(err.to_string(), "Exit Form request not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let err = Error::UnknownKind("bogus".to_string());
        assert_eq!(err.to_string(), "unknown form kind: bogus");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_error() {
        let mut errors = FieldErrors::new();
        errors.add("ucf_id", "UCF ID is required");
        let err = Error::Validation(errors);
        assert!(err.is_validation());
        assert_eq!(
            err.field_errors().and_then(|e| e.get("ucf_id")),
            Some("UCF ID is required")
        );
        assert!(err.to_string().contains("ucf_id"));
    }

    #[test]
    fn test_field_errors_absent_for_other_errors() {
        assert!(Error::internal("boom").field_errors().is_none());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_malformed_is_client_error() {
        let err = Error::malformed("expected an object");
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "malformed payload: expected an object");
    }

    #[test]
    fn test_upload_error_display() {
        let err = Error::upload("resume", "field does not accept files");
        let msg = err.to_string();
        assert!(msg.contains("resume"));
        assert!(msg.contains("does not accept"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_server_error_display() {
        let err = Error::Server {
            status: 500,
            detail: "Error creating request".to_string(),
        };
        assert_eq!(err.to_string(), "server returned 500: Error creating request");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "port must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
