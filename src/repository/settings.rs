//! Compliance-cycle setting repository.

use crate::model::ComplianceCycle;
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};
use log::info;

/// Document id of the singleton cycle setting.
const CYCLE_DOC_ID: &str = "compliance_cycle";

/// Typed access to the `Settings` collection.
///
/// The cycle is a singleton document; reading it when none was ever written
/// yields the default cycle rather than an error, so a fresh deployment is
/// usable before an administrator first saves settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository<S> {
    store: S,
}

impl<S: DocumentStore> SettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the compliance cycle, falling back to the default.
    pub async fn cycle(&self) -> RepositoryResult<ComplianceCycle> {
        let key = DocumentKey::new(Collection::Settings, CYCLE_DOC_ID);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc
            .and_then(|d| decode_document(&key, d))
            .unwrap_or_default())
    }

    /// Overwrite the compliance cycle.
    pub async fn set_cycle(&self, cycle: ComplianceCycle) -> RepositoryResult<()> {
        let doc = serde_json::to_value(cycle)?;
        self.store
            .put(DocumentKey::new(Collection::Settings, CYCLE_DOC_ID), doc)
            .await
            .map_err(RepositoryError::storage)?;
        info!(
            "compliance cycle set to {}-{}",
            cycle.start_year, cycle.end_year
        );
        Ok(())
    }
}
