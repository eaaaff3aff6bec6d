//! Data loading for report generation.
//!
//! The loader is the only I/O component of the reporting pipeline: it
//! fetches the users and certificates visible to the acting principal and
//! hands flat arrays to the pure aggregation functions.

use crate::model::{Certificate, Role, User};
use crate::repository::{CertificateRepository, RepositoryResult, UserRepository};
use crate::storage::DocumentStore;
use log::warn;
use std::collections::HashSet;

/// Which records the acting principal may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Only the principal's own certificates.
    Own(String),
    /// Every principal and every certificate.
    All,
}

impl VisibilityScope {
    /// Derive the scope from a role and the acting principal's id.
    pub fn for_principal(role: Role, user_id: &str) -> Self {
        if role.sees_all_records() {
            VisibilityScope::All
        } else {
            VisibilityScope::Own(user_id.to_string())
        }
    }
}

/// Users and certificates fetched for one report run.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub users: Vec<User>,
    pub certificates: Vec<Certificate>,
}

/// Fetches report input within a visibility scope.
#[derive(Debug, Clone)]
pub struct DataLoader<S> {
    users: UserRepository<S>,
    certificates: CertificateRepository<S>,
}

impl<S: DocumentStore> DataLoader<S> {
    pub fn new(users: UserRepository<S>, certificates: CertificateRepository<S>) -> Self {
        Self {
            users,
            certificates,
        }
    }

    /// Load the users and certificates visible in the scope.
    ///
    /// Certificates referencing a user outside the loaded set are dropped
    /// here with a warning; downstream aggregation never sees them.
    pub async fn load(&self, scope: &VisibilityScope) -> RepositoryResult<LoadedData> {
        let (users, certificates) = match scope {
            VisibilityScope::Own(user_id) => {
                let users = match self.users.get(user_id).await? {
                    Some(user) => vec![user],
                    None => Vec::new(),
                };
                let certificates = self.certificates.list_for_user(user_id).await?;
                (users, certificates)
            }
            VisibilityScope::All => {
                let users = self.users.list().await?;
                let certificates = self.certificates.list().await?;
                (users, certificates)
            }
        };

        let known: HashSet<&str> = users.iter().map(|u| u.id.as_str()).collect();
        let certificates = certificates
            .into_iter()
            .filter(|certificate| {
                let kept = known.contains(certificate.user_id.as_str());
                if !kept {
                    warn!(
                        "dropping certificate {} referencing unknown user {}",
                        certificate.id, certificate.user_id
                    );
                }
                kept
            })
            .collect();

        Ok(LoadedData {
            users,
            certificates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCertificate, NewUser};
    use crate::storage::InMemoryStore;
    use chrono::NaiveDate;

    async fn seed(store: &InMemoryStore) -> (User, User) {
        let users = UserRepository::new(store.clone());
        let certs = CertificateRepository::new(store.clone());

        let staff = User::new(
            NewUser {
                username: "an".into(),
                display_name: "An".into(),
                password: "x".into(),
                role: Role::Staff,
                department_id: None,
                title_id: None,
            },
            "hash".into(),
        );
        let reporter = User::new(
            NewUser {
                username: "binh".into(),
                display_name: "Bình".into(),
                password: "x".into(),
                role: Role::Reporter,
                department_id: None,
                title_id: None,
            },
            "hash".into(),
        );
        users.save(&staff).await.unwrap();
        users.save(&reporter).await.unwrap();

        for (owner, credits) in [(&staff, 10.0), (&staff, 5.0), (&reporter, 2.0)] {
            certs
                .save(&Certificate::new(
                    NewCertificate {
                        name: "CME".into(),
                        credits,
                        issued_on: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                    },
                    owner.id.clone(),
                    None,
                ))
                .await
                .unwrap();
        }
        (staff, reporter)
    }

    #[tokio::test]
    async fn test_scope_for_roles() {
        assert_eq!(
            VisibilityScope::for_principal(Role::Staff, "u-1"),
            VisibilityScope::Own("u-1".into())
        );
        assert_eq!(
            VisibilityScope::for_principal(Role::Admin, "u-1"),
            VisibilityScope::All
        );
        assert_eq!(
            VisibilityScope::for_principal(Role::StaffReporter, "u-1"),
            VisibilityScope::All
        );
    }

    #[tokio::test]
    async fn test_own_scope_limits_to_one_user() {
        let store = InMemoryStore::new();
        let (staff, _) = seed(&store).await;
        let loader = DataLoader::new(
            UserRepository::new(store.clone()),
            CertificateRepository::new(store.clone()),
        );

        let data = loader
            .load(&VisibilityScope::Own(staff.id.clone()))
            .await
            .unwrap();
        assert_eq!(data.users.len(), 1);
        assert_eq!(data.certificates.len(), 2);
    }

    #[tokio::test]
    async fn test_all_scope_sees_everything() {
        let store = InMemoryStore::new();
        seed(&store).await;
        let loader = DataLoader::new(
            UserRepository::new(store.clone()),
            CertificateRepository::new(store.clone()),
        );

        let data = loader.load(&VisibilityScope::All).await.unwrap();
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.certificates.len(), 3);
    }

    #[tokio::test]
    async fn test_orphaned_certificates_dropped() {
        let store = InMemoryStore::new();
        seed(&store).await;
        let certs = CertificateRepository::new(store.clone());
        certs
            .save(&Certificate::new(
                NewCertificate {
                    name: "Orphan".into(),
                    credits: 99.0,
                    issued_on: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                },
                "deleted-user".into(),
                None,
            ))
            .await
            .unwrap();

        let loader = DataLoader::new(
            UserRepository::new(store.clone()),
            CertificateRepository::new(store.clone()),
        );
        let data = loader.load(&VisibilityScope::All).await.unwrap();
        assert_eq!(data.certificates.len(), 3);
    }
}
