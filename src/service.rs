//! Service layer: operations that tie validation, repositories, bridges and
//! the audit log together.
//!
//! Services enforce entry rules and role checks before any I/O, so a
//! validation failure never leaves a partial write behind. Every mutating
//! operation appends an audit entry; audit failures are logged and swallowed
//! by the [`AuditLogger`], never surfaced to the caller.

use crate::auth::hash_password;
use crate::bridge::{FileBridge, UploadedFile};
use crate::error::{CmeError, CmeResult, ValidationError};
use crate::model::{
    AuditAction, AuditEntry, Certificate, ComplianceCycle, Department, NewCertificate, NewUser,
    Title, User, UserUpdate,
};
use crate::repository::{
    AuditLogger, CategoryRepository, CertificateRepository, RepositoryError, SettingsRepository,
    UserRepository,
};
use crate::storage::{Collection, DocumentStore};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde_json::json;

/// An image attached to a certificate at entry time.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Certificate entry, update and deletion.
#[derive(Debug, Clone)]
pub struct CertificateService<S, B> {
    certificates: CertificateRepository<S>,
    bridge: B,
    audit: AuditLogger<S>,
}

impl<S: DocumentStore, B: FileBridge> CertificateService<S, B> {
    pub fn new(certificates: CertificateRepository<S>, bridge: B, audit: AuditLogger<S>) -> Self {
        Self {
            certificates,
            bridge,
            audit,
        }
    }

    /// Create a certificate owned by `owner`, optionally uploading an image
    /// first.
    ///
    /// Validation runs before the upload, so invalid input never spends a
    /// bridge call. If the store write fails after a successful upload the
    /// hosted image is deleted again.
    pub async fn create(
        &self,
        new: NewCertificate,
        owner: &User,
        image: Option<ImageUpload>,
    ) -> CmeResult<Certificate> {
        self.create_at(new, owner, image, Utc::now().date_naive())
            .await
    }

    /// Creation with an explicit "today", so the date rules are testable.
    pub async fn create_at(
        &self,
        new: NewCertificate,
        owner: &User,
        image: Option<ImageUpload>,
        today: NaiveDate,
    ) -> CmeResult<Certificate> {
        new.validate(today)?;

        let uploaded = match image {
            Some(upload) => Some(
                self.bridge
                    .upload(&owner.username, &upload.bytes, &upload.mime_type)
                    .await?,
            ),
            None => None,
        };

        let certificate =
            Certificate::new(new, owner.id.clone(), uploaded.clone().map(Into::into));
        if let Err(err) = self.certificates.save(&certificate).await {
            if let Some(UploadedFile { id, .. }) = uploaded {
                // Don't leave an orphaned image behind a failed write.
                if let Err(cleanup) = self.bridge.delete(&id).await {
                    warn!("failed to clean up image {id} after store failure: {cleanup}");
                }
            }
            return Err(err.into());
        }

        info!(
            "certificate '{}' ({} credits) recorded for {}",
            certificate.name, certificate.credits, owner.username
        );
        self.audit
            .record(AuditEntry::new(
                &owner.username,
                AuditAction::CertificateCreated,
                Some(certificate.id.clone()),
            ))
            .await;
        Ok(certificate)
    }

    /// Update the editable fields of an existing certificate.
    ///
    /// Only the owner or an administrator may edit a record.
    pub async fn update(
        &self,
        id: &str,
        changes: NewCertificate,
        actor: &User,
    ) -> CmeResult<Certificate> {
        self.update_at(id, changes, actor, Utc::now().date_naive())
            .await
    }

    pub async fn update_at(
        &self,
        id: &str,
        changes: NewCertificate,
        actor: &User,
        today: NaiveDate,
    ) -> CmeResult<Certificate> {
        changes.validate(today)?;
        let Some(mut certificate) = self.certificates.get(id).await? else {
            return Err(CmeError::not_found(Collection::Certificates, id));
        };
        ensure_owner_or_admin(actor, &certificate.user_id, "update certificate")?;

        certificate.name = changes.name;
        certificate.credits = changes.credits;
        certificate.issued_on = changes.issued_on;
        certificate.updated_at = Utc::now();
        self.certificates.save(&certificate).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CertificateUpdated,
                Some(certificate.id.clone()),
            ))
            .await;
        Ok(certificate)
    }

    /// Delete a certificate, removing its hosted image as a side effect.
    ///
    /// The store delete comes first; a bridge failure afterwards is logged
    /// but does not resurrect the record.
    pub async fn delete(&self, id: &str, actor: &User) -> CmeResult<()> {
        let Some(certificate) = self.certificates.get(id).await? else {
            return Err(CmeError::not_found(Collection::Certificates, id));
        };
        ensure_owner_or_admin(actor, &certificate.user_id, "delete certificate")?;

        self.certificates.delete(id).await?;
        if let Some(image) = &certificate.image {
            if let Err(err) = self.bridge.delete(&image.file_id).await {
                warn!(
                    "certificate {id} deleted but image {} removal failed: {err}",
                    image.file_id
                );
            }
        }
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CertificateDeleted,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }

    /// Certificates visible to `actor`: all of them for reporting roles,
    /// only their own otherwise.
    pub async fn visible_to(&self, actor: &User) -> CmeResult<Vec<Certificate>> {
        if actor.role.sees_all_records() {
            Ok(self.certificates.list().await?)
        } else {
            Ok(self.certificates.list_for_user(&actor.id).await?)
        }
    }
}

/// Account administration: creation, updates, lockout resets, deletion.
#[derive(Debug, Clone)]
pub struct UserAdminService<S> {
    users: UserRepository<S>,
    audit: AuditLogger<S>,
}

impl<S: DocumentStore> UserAdminService<S> {
    pub fn new(users: UserRepository<S>, audit: AuditLogger<S>) -> Self {
        Self { users, audit }
    }

    /// Create an account. The raw password is hashed here; no plaintext
    /// reaches the repository.
    pub async fn create_user(&self, new: NewUser, actor: &User) -> CmeResult<User> {
        ensure_admin(actor, "create user")?;
        if new.username.trim().is_empty() {
            return Err(ValidationError::missing_field("username").into());
        }
        if new.password.is_empty() {
            return Err(ValidationError::missing_field("password").into());
        }

        let hash = hash_password(&new.password)?;
        let username = new.username.clone();
        let user = User::new(new, hash);
        match self.users.save(&user).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate { .. }) => {
                return Err(ValidationError::DuplicateUsername { username }.into());
            }
            Err(err) => return Err(err.into()),
        }
        info!("account '{}' created by '{}'", username, actor.username);
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::UserCreated,
                Some(user.id.clone()),
            ))
            .await;
        Ok(user)
    }

    /// Apply a partial update to an account.
    pub async fn update_user(&self, id: &str, update: UserUpdate, actor: &User) -> CmeResult<User> {
        ensure_admin(actor, "update user")?;
        let Some(mut user) = self.users.get(id).await? else {
            return Err(CmeError::not_found(Collection::Users, id));
        };

        if let Some(display_name) = update.display_name {
            user.display_name = display_name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        if let Some(department_id) = update.department_id {
            user.department_id = department_id;
        }
        if let Some(title_id) = update.title_id {
            user.title_id = title_id;
        }
        user.updated_at = Utc::now();
        self.users.save(&user).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::UserUpdated,
                Some(user.id.clone()),
            ))
            .await;
        Ok(user)
    }

    /// Replace an account's password with a fresh hash.
    pub async fn set_password(&self, id: &str, password: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "set password")?;
        if password.is_empty() {
            return Err(ValidationError::missing_field("password").into());
        }
        let Some(mut user) = self.users.get(id).await? else {
            return Err(CmeError::not_found(Collection::Users, id));
        };
        user.password_hash = hash_password(password)?;
        user.updated_at = Utc::now();
        self.users.save(&user).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::UserUpdated,
                Some(user.id.clone()),
            ))
            .await;
        Ok(())
    }

    /// Zero the failed-login counter and unlock the account.
    pub async fn reset_lockout(&self, id: &str, actor: &User) -> CmeResult<User> {
        ensure_admin(actor, "reset lockout")?;
        let Some(mut user) = self.users.get(id).await? else {
            return Err(CmeError::not_found(Collection::Users, id));
        };
        user.failed_logins = 0;
        if user.status == crate::model::UserStatus::Locked {
            user.status = crate::model::UserStatus::Active;
        }
        user.updated_at = Utc::now();
        self.users.save(&user).await?;
        info!("lockout reset for '{}' by '{}'", user.username, actor.username);
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::UserUpdated,
                Some(user.id.clone()),
            ))
            .await;
        Ok(user)
    }

    /// Delete an account. An administrator cannot delete themselves.
    pub async fn delete_user(&self, id: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "delete user")?;
        if actor.id == id {
            return Err(CmeError::permission_denied(
                "delete user",
                "a different administrator",
            ));
        }
        let existed = self.users.delete(id).await?;
        if !existed {
            return Err(CmeError::not_found(Collection::Users, id));
        }
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::UserDeleted,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }
}

/// Department and title administration.
#[derive(Debug, Clone)]
pub struct CategoryService<S> {
    categories: CategoryRepository<S>,
    audit: AuditLogger<S>,
}

impl<S: DocumentStore> CategoryService<S> {
    pub fn new(categories: CategoryRepository<S>, audit: AuditLogger<S>) -> Self {
        Self { categories, audit }
    }

    pub async fn create_department(&self, name: &str, actor: &User) -> CmeResult<Department> {
        ensure_admin(actor, "create department")?;
        if name.trim().is_empty() {
            return Err(ValidationError::missing_field("name").into());
        }
        let department = Department::new(name);
        self.categories.save_department(&department).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryCreated,
                Some(department.id.clone()),
            ))
            .await;
        Ok(department)
    }

    pub async fn rename_department(&self, id: &str, name: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "rename department")?;
        if name.trim().is_empty() {
            return Err(ValidationError::missing_field("name").into());
        }
        let Some(mut department) = self.categories.get_department(id).await? else {
            return Err(CmeError::not_found(Collection::Departments, id));
        };
        department.name = name.to_string();
        self.categories.save_department(&department).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryUpdated,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }

    pub async fn delete_department(&self, id: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "delete department")?;
        if !self.categories.delete_department(id).await? {
            return Err(CmeError::not_found(Collection::Departments, id));
        }
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryDeleted,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }

    pub async fn create_title(&self, name: &str, actor: &User) -> CmeResult<Title> {
        ensure_admin(actor, "create title")?;
        if name.trim().is_empty() {
            return Err(ValidationError::missing_field("name").into());
        }
        let title = Title::new(name);
        self.categories.save_title(&title).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryCreated,
                Some(title.id.clone()),
            ))
            .await;
        Ok(title)
    }

    pub async fn rename_title(&self, id: &str, name: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "rename title")?;
        if name.trim().is_empty() {
            return Err(ValidationError::missing_field("name").into());
        }
        let Some(mut title) = self.categories.get_title(id).await? else {
            return Err(CmeError::not_found(Collection::Titles, id));
        };
        title.name = name.to_string();
        self.categories.save_title(&title).await?;
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryUpdated,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }

    pub async fn delete_title(&self, id: &str, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "delete title")?;
        if !self.categories.delete_title(id).await? {
            return Err(CmeError::not_found(Collection::Titles, id));
        }
        self.audit
            .record(AuditEntry::new(
                &actor.username,
                AuditAction::CategoryDeleted,
                Some(id.to_string()),
            ))
            .await;
        Ok(())
    }
}

/// Compliance-cycle administration.
#[derive(Debug, Clone)]
pub struct SettingsService<S> {
    settings: SettingsRepository<S>,
    audit: AuditLogger<S>,
}

impl<S: DocumentStore> SettingsService<S> {
    pub fn new(settings: SettingsRepository<S>, audit: AuditLogger<S>) -> Self {
        Self { settings, audit }
    }

    /// Read the current cycle (default when never set).
    pub async fn cycle(&self) -> CmeResult<ComplianceCycle> {
        Ok(self.settings.cycle().await?)
    }

    /// Overwrite the cycle. The window must be well-formed.
    pub async fn set_cycle(&self, cycle: ComplianceCycle, actor: &User) -> CmeResult<()> {
        ensure_admin(actor, "change settings")?;
        if cycle.start_year > cycle.end_year {
            return Err(ValidationError::invalid_field(
                "cycle",
                format!(
                    "start year {} is after end year {}",
                    cycle.start_year, cycle.end_year
                ),
            )
            .into());
        }
        self.settings.set_cycle(cycle).await?;
        self.audit
            .record(
                AuditEntry::new(&actor.username, AuditAction::SettingsChanged, None)
                    .with_detail(json!({
                        "start_year": cycle.start_year,
                        "end_year": cycle.end_year,
                    })),
            )
            .await;
        Ok(())
    }
}

fn ensure_admin(actor: &User, operation: &str) -> CmeResult<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(CmeError::permission_denied(operation, "admin role"))
    }
}

fn ensure_owner_or_admin(actor: &User, owner_id: &str, operation: &str) -> CmeResult<()> {
    if actor.role.is_admin() || actor.id == owner_id {
        Ok(())
    } else {
        Err(CmeError::permission_denied(operation, "owner or admin role"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::InMemoryFileBridge;
    use crate::model::Role;
    use crate::repository::AuditLogRepository;
    use crate::storage::InMemoryStore;

    fn audit(store: &InMemoryStore) -> AuditLogger<InMemoryStore> {
        AuditLogger::new(AuditLogRepository::new(store.clone()))
    }

    fn person(username: &str, role: Role) -> User {
        User::new(
            NewUser {
                username: username.into(),
                display_name: username.to_uppercase(),
                password: "unused".into(),
                role,
                department_id: None,
                title_id: None,
            },
            "hash".into(),
        )
    }

    fn entry(credits: f64) -> NewCertificate {
        NewCertificate {
            name: "Kiểm soát nhiễm khuẩn".into(),
            credits,
            issued_on: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_create_with_image_uploads_and_links() {
        let store = InMemoryStore::new();
        let bridge = InMemoryFileBridge::new();
        let service = CertificateService::new(
            CertificateRepository::new(store.clone()),
            bridge.clone(),
            audit(&store),
        );
        let owner = person("an", Role::Staff);

        let certificate = service
            .create_at(
                entry(10.0),
                &owner,
                Some(ImageUpload {
                    bytes: b"\x89PNG".to_vec(),
                    mime_type: "image/png".into(),
                }),
                today(),
            )
            .await
            .unwrap();

        let image = certificate.image.unwrap();
        assert!(bridge.contains(&image.file_id).await);
    }

    #[tokio::test]
    async fn test_invalid_entry_spends_no_bridge_call() {
        let store = InMemoryStore::new();
        let bridge = InMemoryFileBridge::new();
        let service = CertificateService::new(
            CertificateRepository::new(store.clone()),
            bridge.clone(),
            audit(&store),
        );
        let owner = person("an", Role::Staff);

        let err = service
            .create_at(
                entry(-1.0),
                &owner,
                Some(ImageUpload {
                    bytes: b"img".to_vec(),
                    mime_type: "image/png".into(),
                }),
                today(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CmeError::Validation(_)));
        assert_eq!(bridge.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_hosted_image() {
        let store = InMemoryStore::new();
        let bridge = InMemoryFileBridge::new();
        let service = CertificateService::new(
            CertificateRepository::new(store.clone()),
            bridge.clone(),
            audit(&store),
        );
        let owner = person("an", Role::Staff);

        let certificate = service
            .create_at(
                entry(10.0),
                &owner,
                Some(ImageUpload {
                    bytes: b"img".to_vec(),
                    mime_type: "image/png".into(),
                }),
                today(),
            )
            .await
            .unwrap();
        service.delete(&certificate.id, &owner).await.unwrap();
        assert_eq!(bridge.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_staff_cannot_touch_others_records() {
        let store = InMemoryStore::new();
        let service = CertificateService::new(
            CertificateRepository::new(store.clone()),
            InMemoryFileBridge::new(),
            audit(&store),
        );
        let owner = person("an", Role::Staff);
        let other = person("binh", Role::Staff);

        let certificate = service
            .create_at(entry(10.0), &owner, None, today())
            .await
            .unwrap();
        let err = service.delete(&certificate.id, &other).await.unwrap_err();
        assert!(matches!(err, CmeError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_create_user_hashes_and_audits() {
        let store = InMemoryStore::new();
        let users = UserRepository::new(store.clone());
        let service = UserAdminService::new(users.clone(), audit(&store));
        let admin = person("admin", Role::Admin);

        let created = service
            .create_user(
                NewUser {
                    username: "an".into(),
                    display_name: "Nguyễn Văn An".into(),
                    password: "s3cret".into(),
                    role: Role::Staff,
                    department_id: None,
                    title_id: None,
                },
                &admin,
            )
            .await
            .unwrap();
        assert!(created.password_hash.starts_with("$argon2id$"));

        let entries = AuditLogRepository::new(store.clone())
            .list(Some(AuditAction::UserCreated), None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_maps_to_validation() {
        let store = InMemoryStore::new();
        let service = UserAdminService::new(UserRepository::new(store.clone()), audit(&store));
        let admin = person("admin", Role::Admin);
        let new = |username: &str| NewUser {
            username: username.into(),
            display_name: "X".into(),
            password: "pw".into(),
            role: Role::Staff,
            department_id: None,
            title_id: None,
        };

        service.create_user(new("an"), &admin).await.unwrap();
        let err = service.create_user(new("an"), &admin).await.unwrap_err();
        assert!(matches!(
            err,
            CmeError::Validation(ValidationError::DuplicateUsername { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_admin_is_refused() {
        let store = InMemoryStore::new();
        let service = UserAdminService::new(UserRepository::new(store.clone()), audit(&store));
        let staff = person("an", Role::Staff);

        let err = service
            .reset_lockout("whoever", &staff)
            .await
            .unwrap_err();
        assert!(matches!(err, CmeError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_reset_lockout_unlocks() {
        let store = InMemoryStore::new();
        let users = UserRepository::new(store.clone());
        let service = UserAdminService::new(users.clone(), audit(&store));
        let admin = person("admin", Role::Admin);
        let mut locked = person("an", Role::Staff);
        locked.status = crate::model::UserStatus::Locked;
        locked.failed_logins = 5;
        users.save(&locked).await.unwrap();

        let reset = service.reset_lockout(&locked.id, &admin).await.unwrap();
        assert_eq!(reset.status, crate::model::UserStatus::Active);
        assert_eq!(reset.failed_logins, 0);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let store = InMemoryStore::new();
        let users = UserRepository::new(store.clone());
        let service = UserAdminService::new(users.clone(), audit(&store));
        let admin = person("admin", Role::Admin);
        users.save(&admin).await.unwrap();

        let err = service.delete_user(&admin.id, &admin).await.unwrap_err();
        assert!(matches!(err, CmeError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_settings_rejects_inverted_cycle() {
        let store = InMemoryStore::new();
        let service = SettingsService::new(SettingsRepository::new(store.clone()), audit(&store));
        let admin = person("admin", Role::Admin);

        let err = service
            .set_cycle(
                ComplianceCycle {
                    start_year: 2025,
                    end_year: 2022,
                },
                &admin,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CmeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let store = InMemoryStore::new();
        let categories = CategoryRepository::new(store.clone());
        let service = CategoryService::new(categories.clone(), audit(&store));
        let admin = person("admin", Role::Admin);

        let department = service
            .create_department("Khoa Nội", &admin)
            .await
            .unwrap();
        service
            .rename_department(&department.id, "Khoa Nội tổng hợp", &admin)
            .await
            .unwrap();
        let fetched = categories
            .get_department(&department.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.name, "Khoa Nội tổng hợp");

        service.delete_department(&department.id, &admin).await.unwrap();
        assert!(
            categories
                .get_department(&department.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
