//! Typed repositories over the document store.
//!
//! Repositories translate between domain structs and the schemaless JSON
//! documents the [`DocumentStore`](crate::storage::DocumentStore) holds.
//! The store enforces no schema, so shape is enforced here at read time: a
//! document that fails to deserialize is dropped from results with a `warn!`
//! rather than failing the whole read. Write paths serialize the typed
//! struct as-is.
//!
//! Repositories carry no caching and no version tokens; concurrent writers
//! follow the store's last-write-wins semantics.

pub mod audit;
pub mod categories;
pub mod certificates;
pub mod settings;
pub mod snapshots;
pub mod users;

pub use audit::{AuditLogRepository, AuditLogger};
pub use categories::CategoryRepository;
pub use certificates::CertificateRepository;
pub use settings::SettingsRepository;
pub use snapshots::SnapshotRepository;
pub use users::UserRepository;

use crate::storage::{Collection, DocumentKey};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur in the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed.
    #[error("Storage failure: {message}")]
    Storage { message: String },

    /// A uniqueness rule was violated.
    #[error("Duplicate value '{value}' for field '{field}' in {collection}")]
    Duplicate {
        collection: Collection,
        field: String,
        value: String,
    },

    /// A referenced document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    /// A domain struct could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Wrap a backend error, erasing its concrete type.
    pub fn storage(error: impl std::error::Error) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Decode a stored document into a domain struct.
///
/// Returns `None` (after logging) when the document doesn't match the
/// expected shape, so one malformed document never poisons a whole listing.
pub(crate) fn decode_document<T: DeserializeOwned>(key: &DocumentKey, doc: Value) -> Option<T> {
    match serde_json::from_value(doc) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("dropping malformed document {key}: {err}");
            None
        }
    }
}
