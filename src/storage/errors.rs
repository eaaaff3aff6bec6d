//! Storage-specific error types for pure data operations.
//!
//! These errors represent failures in the persistence layer and carry no
//! knowledge of domain semantics or business rules.

use crate::storage::Collection;
use thiserror::Error;

/// Errors that can occur during document-store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested document was not found.
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: Collection, id: String },

    /// Invalid query parameters or search criteria.
    #[error("Invalid query on {collection}: {message}")]
    InvalidQuery {
        collection: Collection,
        message: String,
    },

    /// Serialization or deserialization failure inside the backend.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Storage backend is temporarily unavailable.
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    /// Generic internal storage error.
    #[error("Internal storage error: {message}")]
    Internal { message: String },
}

impl StorageError {
    /// Create a document-not-found error.
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            collection,
            id: id.into(),
        }
    }

    /// Create an invalid-query error.
    pub fn invalid_query(collection: Collection, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            collection,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
