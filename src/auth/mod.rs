//! Authentication: password verification and failed-login lockout.
//!
//! Passwords are stored as salted Argon2id PHC strings and verified with a
//! constant-time comparison; the legacy plaintext comparison this replaces
//! is a defect, not behavior to preserve. The lockout threshold (5 failed
//! attempts) is behavior to preserve, so it sits behind the
//! [`LockoutPolicy`] trait rather than being inlined at the call site.
//!
//! Distinct failure causes (unknown user, wrong password, locked, disabled)
//! are distinct [`AuthError`] variants and are logged distinctly; callers
//! may still collapse them into one user-facing message.

use crate::model::{AuditAction, AuditEntry, User, UserStatus};
use crate::repository::{AuditLogger, RepositoryError, UserRepository};
use crate::storage::DocumentStore;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use log::{debug, info, warn};

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account with the given username
    #[error("Unknown username")]
    UnknownUser,

    /// Password did not match
    #[error("Invalid password")]
    WrongPassword,

    /// Account is locked after repeated failures
    #[error("Account is locked")]
    AccountLocked,

    /// Account was disabled by an administrator
    #[error("Account is disabled")]
    AccountDisabled,

    /// Password hashing failed (malformed stored hash or parameter error)
    #[error("Password hashing error: {message}")]
    Hashing { message: String },

    /// Repository failure while loading or updating the account
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Hash a password into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing {
            message: e.to_string(),
        })?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash verifies as false rather than erroring: the
/// caller cannot distinguish it from a wrong password, which is the safe
/// default.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Decides when a run of failed logins locks the account.
pub trait LockoutPolicy: Send + Sync {
    /// Whether the account should transition to `Locked` after the given
    /// (already incremented) consecutive failure count.
    fn should_lock(&self, failed_logins: u32) -> bool;
}

/// Lock after a fixed number of consecutive failures.
#[derive(Debug, Clone, Copy)]
pub struct FixedThresholdLockout {
    pub threshold: u32,
}

impl Default for FixedThresholdLockout {
    fn default() -> Self {
        Self { threshold: 5 }
    }
}

impl LockoutPolicy for FixedThresholdLockout {
    fn should_lock(&self, failed_logins: u32) -> bool {
        failed_logins >= self.threshold
    }
}

/// Authentication service over the user repository.
#[derive(Debug, Clone)]
pub struct Authenticator<S, P = FixedThresholdLockout> {
    users: UserRepository<S>,
    audit: AuditLogger<S>,
    policy: P,
}

impl<S: DocumentStore, P: LockoutPolicy> Authenticator<S, P> {
    pub fn new(users: UserRepository<S>, audit: AuditLogger<S>, policy: P) -> Self {
        Self {
            users,
            audit,
            policy,
        }
    }

    /// Authenticate a username/password pair.
    ///
    /// On success the failed-login counter is reset and a login audit entry
    /// written. A wrong password increments the counter and may lock the
    /// account per the policy; the caller still sees `WrongPassword` for
    /// that attempt.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<User> {
        let Some(mut user) = self.users.find_by_username(username).await? else {
            debug!("login failed: unknown username '{username}'");
            self.audit
                .record(AuditEntry::new(username, AuditAction::LoginFailed, None))
                .await;
            return Err(AuthError::UnknownUser);
        };

        match user.status {
            UserStatus::Locked => {
                warn!("login rejected: account '{username}' is locked");
                return Err(AuthError::AccountLocked);
            }
            UserStatus::Disabled => {
                warn!("login rejected: account '{username}' is disabled");
                return Err(AuthError::AccountDisabled);
            }
            UserStatus::Active => {}
        }

        if verify_password(password, &user.password_hash) {
            if user.failed_logins > 0 {
                user.failed_logins = 0;
                self.users.save(&user).await?;
            }
            info!("login succeeded for '{username}'");
            self.audit
                .record(AuditEntry::new(
                    username,
                    AuditAction::Login,
                    Some(user.id.clone()),
                ))
                .await;
            Ok(user)
        } else {
            user.failed_logins += 1;
            let locked = self.policy.should_lock(user.failed_logins);
            if locked {
                user.status = UserStatus::Locked;
                warn!(
                    "account '{username}' locked after {} failed logins",
                    user.failed_logins
                );
            } else {
                debug!(
                    "login failed for '{username}' ({} consecutive failures)",
                    user.failed_logins
                );
            }
            self.users.save(&user).await?;
            self.audit
                .record(AuditEntry::new(
                    username,
                    AuditAction::LoginFailed,
                    Some(user.id.clone()),
                ))
                .await;
            if locked {
                self.audit
                    .record(AuditEntry::new(
                        username,
                        AuditAction::AccountLocked,
                        Some(user.id.clone()),
                    ))
                    .await;
            }
            Err(AuthError::WrongPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Role};
    use crate::repository::AuditLogRepository;
    use crate::storage::InMemoryStore;

    fn fixture(store: &InMemoryStore) -> (Authenticator<InMemoryStore>, UserRepository<InMemoryStore>) {
        let users = UserRepository::new(store.clone());
        let audit = AuditLogger::new(AuditLogRepository::new(store.clone()));
        (
            Authenticator::new(users.clone(), audit, FixedThresholdLockout::default()),
            users,
        )
    }

    async fn seed_user(users: &UserRepository<InMemoryStore>, password: &str) -> User {
        let user = User::new(
            NewUser {
                username: "an".into(),
                display_name: "Nguyễn Văn An".into(),
                password: password.into(),
                role: Role::Staff,
                department_id: None,
                title_id: None,
            },
            hash_password(password).unwrap(),
        );
        users.save(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_successful_login_resets_counter() {
        let store = InMemoryStore::new();
        let (auth, users) = fixture(&store);
        let mut user = seed_user(&users, "s3cret").await;
        user.failed_logins = 3;
        users.save(&user).await.unwrap();

        let logged_in = auth.login("an", "s3cret").await.unwrap();
        assert_eq!(logged_in.failed_logins, 0);

        let stored = users.get(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_logins, 0);
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let store = InMemoryStore::new();
        let (auth, users) = fixture(&store);
        let user = seed_user(&users, "s3cret").await;

        for _ in 0..5 {
            let err = auth.login("an", "wrong").await.unwrap_err();
            assert!(matches!(err, AuthError::WrongPassword));
        }

        let stored = users.get(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.status, UserStatus::Locked);
        assert_eq!(stored.failed_logins, 5);

        // Correct password no longer helps once locked.
        let err = auth.login("an", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked));
    }

    #[tokio::test]
    async fn test_unknown_user_is_distinct() {
        let store = InMemoryStore::new();
        let (auth, _) = fixture(&store);
        let err = auth.login("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));
    }

    #[tokio::test]
    async fn test_disabled_account_rejected() {
        let store = InMemoryStore::new();
        let (auth, users) = fixture(&store);
        let mut user = seed_user(&users, "s3cret").await;
        user.status = UserStatus::Disabled;
        users.save(&user).await.unwrap();

        let err = auth.login("an", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));
    }
}
