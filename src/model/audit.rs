//! Append-only audit log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of auditable actions, drawn from a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    LoginFailed,
    AccountLocked,
    UserCreated,
    UserUpdated,
    UserDeleted,
    CertificateCreated,
    CertificateUpdated,
    CertificateDeleted,
    CategoryCreated,
    CategoryUpdated,
    CategoryDeleted,
    SettingsChanged,
    SnapshotPublished,
    SnapshotExtended,
    SnapshotRevoked,
}

/// One audit record: who did what to which target.
///
/// Write-only from the application's perspective; read back (with simple
/// filters) only by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    /// Username of the acting principal, or "system".
    pub actor: String,
    pub action: AuditAction,
    /// Identifier of the affected document, when one exists.
    pub target: Option<String>,
    /// Optional free-form detail payload.
    pub detail: Option<serde_json::Value>,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build an entry timestamped now.
    pub fn new(actor: impl Into<String>, action: AuditAction, target: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            actor: actor.into(),
            action,
            target,
            detail: None,
            at: Utc::now(),
        }
    }

    /// Attach a detail payload.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}
