//! Principal (user account) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a principal, drawn from a closed set.
///
/// `StaffReporter` combines the staff self-service surface with the
/// reporter's read-all visibility; it is a distinct role rather than a role
/// list so that documents stay a single scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Reporter,
    StaffReporter,
}

impl Role {
    /// Whether this role may see every principal's certificates.
    pub fn sees_all_records(self) -> bool {
        matches!(self, Role::Admin | Role::Reporter | Role::StaffReporter)
    }

    /// Whether this role may administer accounts, categories and settings.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may generate reports.
    pub fn can_report(self) -> bool {
        matches!(self, Role::Admin | Role::Reporter | Role::StaffReporter)
    }
}

/// Lifecycle status of a principal.
///
/// A `Locked` principal cannot authenticate until an administrator resets
/// the failed-login counter; `Disabled` is an explicit administrative hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
    Locked,
}

/// A principal: an account that can authenticate and own certificates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    /// Argon2id PHC string. Never exposed to rendering layers.
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    /// Department the principal belongs to, when assigned.
    pub department_id: Option<String>,
    /// Title determining the compliance target, when assigned.
    pub title_id: Option<String>,
    /// Consecutive failed logins; reset on success or administrator action.
    pub failed_logins: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Construct an active principal with a fresh id and zeroed counters.
    pub fn new(new: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            display_name: new.display_name,
            password_hash,
            role: new.role,
            status: UserStatus::Active,
            department_id: new.department_id,
            title_id: new.title_id,
            failed_logins: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the principal can currently authenticate.
    pub fn can_authenticate(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Input for creating a principal. The raw password is hashed by the
/// service layer before a [`User`] document exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: Role,
    pub department_id: Option<String>,
    pub title_id: Option<String>,
}

/// Partial update applied by an administrator or (for a restricted subset)
/// the principal themselves. `None` means no change.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// `Some(Some(id))` assigns, `Some(None)` clears, `None` leaves as-is.
    pub department_id: Option<Option<String>>,
    pub title_id: Option<Option<String>>,
}
