//! Certificate (credit record) domain model.

use crate::error::{ValidationError, ValidationResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Earliest issue date the entry forms accept.
pub const ISSUE_DATE_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(d) => d,
    None => unreachable!(),
};

/// Reference to an image stored through the file bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Identifier on the hosting side, used for deletion.
    pub file_id: String,
    /// Public view URL.
    pub url: String,
}

/// A certificate record, owned by exactly one principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Credit-hours granted; validated finite and positive at entry.
    pub credits: f64,
    pub issued_on: NaiveDate,
    pub image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    /// Build a certificate from validated input.
    pub fn new(new: NewCertificate, user_id: String, image: Option<ImageRef>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name: new.name,
            credits: new.credits,
            issued_on: new.issued_on,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a certificate record.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub name: String,
    pub credits: f64,
    pub issued_on: NaiveDate,
}

impl NewCertificate {
    /// Validate the entry rules against a reference "today".
    ///
    /// Enforced here, not at the storage layer: the name must be non-empty,
    /// the credit value finite and positive, and the issue date within
    /// `[ISSUE_DATE_EPOCH, today]`.
    pub fn validate(&self, today: NaiveDate) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing_field("name"));
        }
        if !self.credits.is_finite() || self.credits <= 0.0 {
            return Err(ValidationError::InvalidCredits {
                value: self.credits,
            });
        }
        if self.issued_on < ISSUE_DATE_EPOCH {
            return Err(ValidationError::DateBeforeEpoch {
                date: self.issued_on,
                epoch: ISSUE_DATE_EPOCH,
            });
        }
        if self.issued_on > today {
            return Err(ValidationError::DateInFuture {
                date: self.issued_on,
            });
        }
        Ok(())
    }
}
