//! Department and title lookup repositories.

use crate::model::{Department, Title};
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};

/// Typed access to the `Departments` and `Titles` collections.
///
/// Both are simple named lookup entities; the two sets share one repository
/// because every caller that needs one needs the other.
#[derive(Debug, Clone)]
pub struct CategoryRepository<S> {
    store: S,
}

impl<S: DocumentStore> CategoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn save_department(&self, department: &Department) -> RepositoryResult<()> {
        let doc = serde_json::to_value(department)?;
        self.store
            .put(
                DocumentKey::new(Collection::Departments, department.id.clone()),
                doc,
            )
            .await
            .map_err(RepositoryError::storage)?;
        Ok(())
    }

    pub async fn get_department(&self, id: &str) -> RepositoryResult<Option<Department>> {
        let key = DocumentKey::new(Collection::Departments, id);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc.and_then(|d| decode_document(&key, d)))
    }

    pub async fn list_departments(&self) -> RepositoryResult<Vec<Department>> {
        let entries = self
            .store
            .list(Collection::Departments)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    pub async fn delete_department(&self, id: &str) -> RepositoryResult<bool> {
        self.store
            .delete(DocumentKey::new(Collection::Departments, id))
            .await
            .map_err(RepositoryError::storage)
    }

    pub async fn save_title(&self, title: &Title) -> RepositoryResult<()> {
        let doc = serde_json::to_value(title)?;
        self.store
            .put(DocumentKey::new(Collection::Titles, title.id.clone()), doc)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(())
    }

    pub async fn get_title(&self, id: &str) -> RepositoryResult<Option<Title>> {
        let key = DocumentKey::new(Collection::Titles, id);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc.and_then(|d| decode_document(&key, d)))
    }

    pub async fn list_titles(&self) -> RepositoryResult<Vec<Title>> {
        let entries = self
            .store
            .list(Collection::Titles)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    pub async fn delete_title(&self, id: &str) -> RepositoryResult<bool> {
        self.store
            .delete(DocumentKey::new(Collection::Titles, id))
            .await
            .map_err(RepositoryError::storage)
    }
}
