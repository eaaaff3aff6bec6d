//! Append-only audit log repository and the fire-and-forget logger.

use crate::model::{AuditAction, AuditEntry};
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};
use log::warn;

/// Typed access to the `AuditLogs` collection.
///
/// Append-only from the application's perspective; entries are never
/// updated or deleted here.
#[derive(Debug, Clone)]
pub struct AuditLogRepository<S> {
    store: S,
}

impl<S: DocumentStore> AuditLogRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append one entry.
    pub async fn append(&self, entry: &AuditEntry) -> RepositoryResult<()> {
        let doc = serde_json::to_value(entry)?;
        self.store
            .put(DocumentKey::new(Collection::AuditLogs, entry.id.clone()), doc)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(())
    }

    /// List entries, optionally filtered by action and/or actor.
    ///
    /// Simple equality filters only, matching the store's query surface.
    pub async fn list(
        &self,
        action: Option<AuditAction>,
        actor: Option<&str>,
    ) -> RepositoryResult<Vec<AuditEntry>> {
        let entries = self
            .store
            .list(Collection::AuditLogs)
            .await
            .map_err(RepositoryError::storage)?;
        let mut result: Vec<AuditEntry> = entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .filter(|entry: &AuditEntry| {
                action.is_none_or(|a| entry.action == a)
                    && actor.is_none_or(|name| entry.actor == name)
            })
            .collect();
        result.sort_by_key(|entry| entry.at);
        Ok(result)
    }
}

/// Fire-and-forget audit writer.
///
/// A failed audit write must never block or surface to the acting user;
/// it is logged at warn level and swallowed.
#[derive(Debug, Clone)]
pub struct AuditLogger<S> {
    repository: AuditLogRepository<S>,
}

impl<S: DocumentStore> AuditLogger<S> {
    pub fn new(repository: AuditLogRepository<S>) -> Self {
        Self { repository }
    }

    /// Record an entry, swallowing any failure.
    pub async fn record(&self, entry: AuditEntry) {
        if let Err(err) = self.repository.append(&entry).await {
            warn!(
                "audit write failed for {:?} by {}: {err}",
                entry.action, entry.actor
            );
        }
    }
}
