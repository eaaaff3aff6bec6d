//! Certificate repository.

use crate::model::Certificate;
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};
use log::debug;

/// Typed access to the `Certificates` collection.
#[derive(Debug, Clone)]
pub struct CertificateRepository<S> {
    store: S,
}

impl<S: DocumentStore> CertificateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a certificate (create or overwrite).
    pub async fn save(&self, certificate: &Certificate) -> RepositoryResult<()> {
        let doc = serde_json::to_value(certificate)?;
        self.store
            .put(
                DocumentKey::new(Collection::Certificates, certificate.id.clone()),
                doc,
            )
            .await
            .map_err(RepositoryError::storage)?;
        debug!(
            "saved certificate {} for user {}",
            certificate.id, certificate.user_id
        );
        Ok(())
    }

    /// Fetch one certificate by id.
    pub async fn get(&self, id: &str) -> RepositoryResult<Option<Certificate>> {
        let key = DocumentKey::new(Collection::Certificates, id);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc.and_then(|d| decode_document(&key, d)))
    }

    /// List every well-formed certificate document.
    pub async fn list(&self) -> RepositoryResult<Vec<Certificate>> {
        let entries = self
            .store
            .list(Collection::Certificates)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    /// List the certificates owned by one principal.
    pub async fn list_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Certificate>> {
        let entries = self
            .store
            .find_by_field(Collection::Certificates, "user_id", user_id)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    /// Delete a certificate; `true` if one existed.
    pub async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.store
            .delete(DocumentKey::new(Collection::Certificates, id))
            .await
            .map_err(RepositoryError::storage)
    }
}
