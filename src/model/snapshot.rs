//! Shared report snapshot document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::ReportKind;

/// An immutable, time-boxed, token-gated copy of a materialized report.
///
/// Headers and rows are stored as opaque serialized blobs, not re-queryable
/// structured data: a snapshot is independent of the live dataset and stays
/// readable even after the underlying users or certificates change.
///
/// Lifecycle: `Active` while `now < expires_at`, `Expired` afterwards with no
/// explicit transition call. `update_expiry` moving the bound forward past
/// "now" re-enters `Active`; revocation deletes the document from either
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub id: String,
    pub title: String,
    pub kind: ReportKind,
    /// Serialized column set of the materialized report.
    pub headers: serde_json::Value,
    /// Serialized rows of the materialized report.
    pub rows: serde_json::Value,
    /// Display name of the publishing principal.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Opaque access token required to resolve the snapshot.
    pub token: String,
}

impl ReportSnapshot {
    /// Whether the snapshot is past its expiry at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
