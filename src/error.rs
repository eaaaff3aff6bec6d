//! Error types for CME tracker operations.
//!
//! This module provides the top-level error enum that operations across the
//! crate converge on, following Rust's error handling best practices with
//! detailed error information per failure cause.

use crate::storage::Collection;

/// Main error type for CME tracker operations.
///
/// Covers the failure conditions that can occur across the service layer,
/// providing detailed context for each error type. Layer-specific errors
/// (storage, repository, auth, sharing) convert into this type at the
/// service boundary.
#[derive(Debug, thiserror::Error)]
pub enum CmeError {
    /// Validation errors when input data doesn't satisfy entry rules
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Errors from the backing document store
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Errors from the typed repository layer
    #[error("Repository error: {0}")]
    Repository(#[from] crate::repository::RepositoryError),

    /// Authentication failures
    #[error("Authentication error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    /// Snapshot access failures
    #[error("Snapshot access error: {0}")]
    Access(#[from] crate::sharing::AccessError),

    /// External bridge (file storage / extraction) failures
    #[error("Bridge error: {0}")]
    Bridge(#[from] crate::bridge::BridgeError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A referenced document does not exist
    #[error("Not found: {collection} document '{id}'")]
    NotFound { collection: Collection, id: String },

    /// The acting principal lacks the role required for an operation
    #[error("Permission denied: {operation} requires {required}")]
    PermissionDenied {
        operation: String,
        required: String,
    },

    /// Internal errors that indicate a bug rather than bad input
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Validation errors raised before any I/O is attempted.
///
/// These mirror the entry rules of the certificate and account forms: a
/// failed validation blocks the operation with no store or bridge call made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required field is missing or empty
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    /// Credit value is not a positive finite number
    #[error("Credit value {value} is invalid: must be a positive finite number")]
    InvalidCredits { value: f64 },

    /// Issue date precedes the fixed epoch
    #[error("Issue date {date} precedes the earliest accepted date {epoch}")]
    DateBeforeEpoch {
        date: chrono::NaiveDate,
        epoch: chrono::NaiveDate,
    },

    /// Issue date lies in the future
    #[error("Issue date {date} is in the future")]
    DateInFuture { date: chrono::NaiveDate },

    /// Expiry date lies strictly before the current day
    #[error("Expiry date {date} is before today")]
    ExpiryInPast { date: chrono::NaiveDate },

    /// Username already taken by another account
    #[error("Username '{username}' is already in use")]
    DuplicateUsername { username: String },

    /// Field value violates a format or range rule
    #[error("Field '{field}' is invalid: {message}")]
    InvalidField { field: String, message: String },
}

// Convenience constructors for common errors
impl CmeError {
    /// Create a not-found error
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Create a permission-denied error
    pub fn permission_denied(
        operation: impl Into<String>,
        required: impl Into<String>,
    ) -> Self {
        Self::PermissionDenied {
            operation: operation.into(),
            required: required.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ValidationError {
    /// Create a missing-field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid-field error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

// Result type aliases for convenience
pub type CmeResult<T> = Result<T, CmeError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
