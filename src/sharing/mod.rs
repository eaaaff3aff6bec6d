//! Shareable report snapshots.
//!
//! Publishing persists an immutable copy of a materialized report's headers
//! and rows as one opaque document, together with metadata and a random
//! access token. Resolution is deny-by-default: an unknown id, a passed
//! expiry or a token mismatch each block access. The three causes render
//! identically to an end viewer but are logged distinctly for diagnosis;
//! raw tokens never reach the log, only SHA-256 fingerprints.

use crate::error::ValidationError;
use crate::model::{AuditAction, AuditEntry, ReportSnapshot};
use crate::report::{Column, Report, ReportRow};
use crate::repository::{AuditLogger, RepositoryError, SnapshotRepository};
use crate::storage::DocumentStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fixed snapshot lifetime from publication.
pub const SNAPSHOT_TTL_DAYS: i64 = 7;

/// Why snapshot access was denied (or an operation rejected).
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No snapshot with the given id
    #[error("Snapshot not found")]
    NotFound,

    /// The snapshot's expiry timestamp has passed
    #[error("Snapshot has expired")]
    Expired,

    /// The supplied token does not match the snapshot's token
    #[error("Access token mismatch")]
    TokenMismatch,

    /// An expiry update was rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The snapshot repository failed
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The stored blob could not be decoded back into report rows
    #[error("Stored snapshot is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Outcome of publishing: what the caller needs to build a share link.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedSnapshot {
    pub id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A successfully resolved snapshot: the report plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSnapshot {
    pub report: Report,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Publishes, resolves and administers report snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher<S> {
    snapshots: SnapshotRepository<S>,
    audit: AuditLogger<S>,
}

impl<S: DocumentStore> SnapshotPublisher<S> {
    pub fn new(snapshots: SnapshotRepository<S>, audit: AuditLogger<S>) -> Self {
        Self { snapshots, audit }
    }

    /// Persist an immutable copy of a report.
    ///
    /// A single document write: either the whole snapshot exists afterwards
    /// or nothing does. Expiry is fixed at publication time plus
    /// [`SNAPSHOT_TTL_DAYS`].
    pub async fn publish(
        &self,
        report: &Report,
        created_by: &str,
    ) -> Result<PublishedSnapshot, AccessError> {
        let now = Utc::now();
        let snapshot = ReportSnapshot {
            id: Uuid::new_v4().to_string(),
            title: report.title.clone(),
            kind: report.kind,
            headers: serde_json::to_value(&report.columns)?,
            rows: serde_json::to_value(&report.rows)?,
            created_by: created_by.to_string(),
            created_at: now,
            expires_at: now + Duration::days(SNAPSHOT_TTL_DAYS),
            token: Uuid::new_v4().to_string(),
        };
        self.snapshots.save(&snapshot).await?;
        info!(
            "published snapshot {} (token fp {}) expiring {}",
            snapshot.id,
            token_fingerprint(&snapshot.token),
            snapshot.expires_at
        );
        self.audit
            .record(AuditEntry::new(
                created_by,
                AuditAction::SnapshotPublished,
                Some(snapshot.id.clone()),
            ))
            .await;
        Ok(PublishedSnapshot {
            id: snapshot.id,
            token: snapshot.token,
            expires_at: snapshot.expires_at,
        })
    }

    /// Resolve a snapshot by id and token, judged against the current time.
    pub async fn resolve(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<ResolvedSnapshot, AccessError> {
        self.resolve_at(id, token, Utc::now()).await
    }

    /// Resolution with an explicit clock, so expiry is testable.
    ///
    /// Denial order: unknown id, then expiry (regardless of token
    /// correctness), then token mismatch.
    pub async fn resolve_at(
        &self,
        id: &str,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSnapshot, AccessError> {
        let Some(snapshot) = self.snapshots.get(id).await? else {
            debug!("snapshot {id} not found");
            return Err(AccessError::NotFound);
        };
        if snapshot.is_expired_at(now) {
            debug!("snapshot {id} expired at {}", snapshot.expires_at);
            return Err(AccessError::Expired);
        }
        if token != Some(snapshot.token.as_str()) {
            warn!(
                "snapshot {id} token mismatch (expected fp {}, got fp {})",
                token_fingerprint(&snapshot.token),
                token.map(token_fingerprint).unwrap_or_else(|| "none".into())
            );
            return Err(AccessError::TokenMismatch);
        }

        let columns: Vec<Column> = serde_json::from_value(snapshot.headers)?;
        let rows: Vec<ReportRow> = serde_json::from_value(snapshot.rows)?;
        Ok(ResolvedSnapshot {
            report: Report {
                kind: snapshot.kind,
                title: snapshot.title,
                columns,
                rows,
            },
            created_by: snapshot.created_by,
            created_at: snapshot.created_at,
            expires_at: snapshot.expires_at,
        })
    }

    /// Move a snapshot's expiry to the end of `new_date` (UTC).
    ///
    /// Backdating is rejected: the new date must be today or later. Moving
    /// the bound forward past "now" makes an expired snapshot active again.
    pub async fn update_expiry(
        &self,
        id: &str,
        new_date: NaiveDate,
        actor: &str,
    ) -> Result<DateTime<Utc>, AccessError> {
        self.update_expiry_at(id, new_date, actor, Utc::now().date_naive())
            .await
    }

    /// Expiry update with an explicit "today", so the boundary is testable.
    pub async fn update_expiry_at(
        &self,
        id: &str,
        new_date: NaiveDate,
        actor: &str,
        today: NaiveDate,
    ) -> Result<DateTime<Utc>, AccessError> {
        if new_date < today {
            return Err(AccessError::Validation(ValidationError::ExpiryInPast {
                date: new_date,
            }));
        }
        let Some(mut snapshot) = self.snapshots.get(id).await? else {
            return Err(AccessError::NotFound);
        };
        let end_of_day = new_date
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| new_date.and_time(chrono::NaiveTime::MIN))
            .and_utc();
        snapshot.expires_at = end_of_day;
        self.snapshots.save(&snapshot).await?;
        info!("snapshot {id} expiry moved to {end_of_day}");
        self.audit
            .record(AuditEntry::new(
                actor,
                AuditAction::SnapshotExtended,
                Some(id.to_string()),
            ))
            .await;
        Ok(end_of_day)
    }

    /// Delete a snapshot. Idempotent: revoking an unknown id succeeds.
    pub async fn revoke(&self, id: &str, actor: &str) -> Result<(), AccessError> {
        let existed = self.snapshots.delete(id).await?;
        if existed {
            info!("snapshot {id} revoked");
            self.audit
                .record(AuditEntry::new(
                    actor,
                    AuditAction::SnapshotRevoked,
                    Some(id.to_string()),
                ))
                .await;
        } else {
            debug!("revoke of unknown snapshot {id} ignored");
        }
        Ok(())
    }

    /// Revoke several snapshots; failures stop the batch.
    pub async fn revoke_many(&self, ids: &[String], actor: &str) -> Result<(), AccessError> {
        for id in ids {
            self.revoke(id, actor).await?;
        }
        Ok(())
    }

    /// List all snapshots for administration.
    pub async fn list(&self) -> Result<Vec<ReportSnapshot>, AccessError> {
        Ok(self.snapshots.list().await?)
    }
}

/// Short SHA-256 fingerprint safe to log in place of a raw token.
fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}
