//! Document-store abstraction for CME tracker data.
//!
//! This module provides a clean separation between persistence concerns and
//! domain logic. The [`DocumentStore`] trait defines collection-scoped CRUD
//! and simple equality queries over schemaless JSON documents, matching the
//! consistency model of a managed document database: last write wins, no
//! version tokens, no server-enforced schema.
//!
//! The storage layer is responsible for:
//! - Pure PUT/GET/DELETE operations on JSON documents
//! - Collection organization and deterministic listing order
//! - Exact-match field queries (dot paths supported)
//!
//! The storage layer is NOT responsible for:
//! - Document shape enforcement (repositories do that at read time)
//! - Entry validation or business rules
//! - Audit logging
//!
//! Concurrency note: concurrent writers to the same document follow
//! last-write-wins with no version check. The trait seam exists so a future
//! backend could add version tokens without touching call sites.

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::{InMemoryStore, InMemoryStoreStats};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Logical collections of the CME document store, as a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Users,
    Certificates,
    Departments,
    Titles,
    Settings,
    SharedReports,
    AuditLogs,
}

impl Collection {
    /// Stable collection name used by backends that key on strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "Users",
            Collection::Certificates => "Certificates",
            Collection::Departments => "Departments",
            Collection::Titles => "Titles",
            Collection::Settings => "Settings",
            Collection::SharedReports => "SharedReports",
            Collection::AuditLogs => "AuditLogs",
        }
    }

    /// All collections, in declaration order.
    pub fn all() -> [Collection; 7] {
        [
            Collection::Users,
            Collection::Certificates,
            Collection::Departments,
            Collection::Titles,
            Collection::Settings,
            Collection::SharedReports,
            Collection::AuditLogs,
        ]
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key identifying one document: `collection` → `document id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    collection: Collection,
    id: String,
}

impl DocumentKey {
    /// Create a new document key.
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// Get the collection.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Get the document id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Core trait for document-store backends.
///
/// Implementations handle pure persistence of JSON documents without any
/// knowledge of domain semantics. All operations are async and `Send` so
/// stores can be shared across tasks.
///
/// # Design decisions
///
/// - **No separate CREATE/UPDATE**: both are `put`. Whether an operation is
///   a create or an overwrite is business logic that belongs above this
///   layer.
/// - **`delete` returns a boolean**: callers can distinguish "removed" from
///   "was never there" without an extra read.
/// - **`list` ordering is deterministic** (ascending document id) so paging
///   and tests are stable across runs.
pub trait DocumentStore: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a document at the given key, replacing any existing document.
    ///
    /// Returns the stored document, exactly as a subsequent `get` would.
    fn put(
        &self,
        key: DocumentKey,
        document: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Retrieve a document by key; `None` if it does not exist.
    fn get(
        &self,
        key: DocumentKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete a document by key.
    ///
    /// Returns `true` if the document existed, `false` otherwise.
    fn delete(&self, key: DocumentKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// List all documents in a collection as (key, document) pairs,
    /// ordered by ascending document id.
    fn list(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<(DocumentKey, Value)>, Self::Error>> + Send;

    /// Find documents whose field exactly matches a value.
    ///
    /// `field` is a dot path (e.g. `"username"`, `"image.file_id"`);
    /// matching compares the stringified leaf value.
    fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(DocumentKey, Value)>, Self::Error>> + Send;

    /// Count documents in a collection.
    fn count(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Remove every document from every collection. Intended for tests.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
