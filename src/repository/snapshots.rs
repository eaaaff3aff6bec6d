//! Shared report snapshot repository.

use crate::model::ReportSnapshot;
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};

/// Typed access to the `SharedReports` collection.
#[derive(Debug, Clone)]
pub struct SnapshotRepository<S> {
    store: S,
}

impl<S: DocumentStore> SnapshotRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a snapshot as a single document write.
    pub async fn save(&self, snapshot: &ReportSnapshot) -> RepositoryResult<()> {
        let doc = serde_json::to_value(snapshot)?;
        self.store
            .put(
                DocumentKey::new(Collection::SharedReports, snapshot.id.clone()),
                doc,
            )
            .await
            .map_err(RepositoryError::storage)?;
        Ok(())
    }

    /// Fetch one snapshot by id.
    pub async fn get(&self, id: &str) -> RepositoryResult<Option<ReportSnapshot>> {
        let key = DocumentKey::new(Collection::SharedReports, id);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc.and_then(|d| decode_document(&key, d)))
    }

    /// List every well-formed snapshot document.
    pub async fn list(&self) -> RepositoryResult<Vec<ReportSnapshot>> {
        let entries = self
            .store
            .list(Collection::SharedReports)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    /// Delete a snapshot; `true` if one existed.
    pub async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.store
            .delete(DocumentKey::new(Collection::SharedReports, id))
            .await
            .map_err(RepositoryError::storage)
    }
}
