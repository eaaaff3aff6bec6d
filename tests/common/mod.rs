//! Shared fixtures for integration tests.

use chrono::NaiveDate;
use cme_tracker::model::{AuditAction, Certificate, NewCertificate, NewUser};
use cme_tracker::repository::{
    AuditLogRepository, AuditLogger, CategoryRepository, CertificateRepository,
    SettingsRepository, SnapshotRepository, UserRepository,
};
use cme_tracker::sharing::SnapshotPublisher;
use cme_tracker::storage::InMemoryStore;
use cme_tracker::{Role, User};

/// One store with every repository hanging off it.
pub struct Fixture {
    pub store: InMemoryStore,
    pub users: UserRepository<InMemoryStore>,
    pub certificates: CertificateRepository<InMemoryStore>,
    pub categories: CategoryRepository<InMemoryStore>,
    pub settings: SettingsRepository<InMemoryStore>,
    pub audit_log: AuditLogRepository<InMemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        // Surface `log` output from the crate when a test fails.
        let _ = env_logger::builder().is_test(true).try_init();
        let store = InMemoryStore::new();
        Self {
            users: UserRepository::new(store.clone()),
            certificates: CertificateRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            settings: SettingsRepository::new(store.clone()),
            audit_log: AuditLogRepository::new(store.clone()),
            store,
        }
    }

    pub fn audit_logger(&self) -> AuditLogger<InMemoryStore> {
        AuditLogger::new(self.audit_log.clone())
    }

    pub fn publisher(&self) -> SnapshotPublisher<InMemoryStore> {
        SnapshotPublisher::new(
            SnapshotRepository::new(self.store.clone()),
            self.audit_logger(),
        )
    }

    /// Seed and persist a user.
    pub async fn seed_user(&self, username: &str, display_name: &str, role: Role) -> User {
        let user = make_user(username, display_name, role);
        self.users.save(&user).await.unwrap();
        user
    }

    /// Seed and persist a certificate issued on the given date.
    pub async fn seed_certificate(
        &self,
        owner: &User,
        name: &str,
        credits: f64,
        issued_on: NaiveDate,
    ) -> Certificate {
        let certificate = Certificate::new(
            NewCertificate {
                name: name.into(),
                credits,
                issued_on,
            },
            owner.id.clone(),
            None,
        );
        self.certificates.save(&certificate).await.unwrap();
        certificate
    }

    /// Count audit entries for one action.
    pub async fn audit_count(&self, action: AuditAction) -> usize {
        self.audit_log.list(Some(action), None).await.unwrap().len()
    }
}

pub fn make_user(username: &str, display_name: &str, role: Role) -> User {
    User::new(
        NewUser {
            username: username.into(),
            display_name: display_name.into(),
            password: "unused".into(),
            role,
            department_id: None,
            title_id: None,
        },
        "hash".into(),
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
