//! Continuing medical education (CME) compliance tracking library.
//!
//! Provides async-first account, certificate and category management over a
//! pluggable document store, plus a pure reporting pipeline with shareable
//! snapshot publication.
//!
//! # Core Components
//!
//! - [`DocumentStore`] - Trait for implementing storage backends
//! - [`CertificateService`] / [`UserAdminService`] - Validated, audited
//!   mutations over the store
//! - [`report`] - Load, aggregate, materialize and export compliance reports
//! - [`SnapshotPublisher`] - Token-gated, expiring report snapshots
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cme_tracker::repository::{AuditLogRepository, AuditLogger, CertificateRepository};
//! use cme_tracker::bridge::InMemoryFileBridge;
//! use cme_tracker::storage::InMemoryStore;
//! use cme_tracker::CertificateService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let audit = AuditLogger::new(AuditLogRepository::new(store.clone()));
//! let service = CertificateService::new(
//!     CertificateRepository::new(store),
//!     InMemoryFileBridge::new(),
//!     audit,
//! );
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod bridge;
pub mod context;
pub mod error;
pub mod model;
pub mod report;
pub mod repository;
pub mod service;
pub mod sharing;
pub mod storage;

// Re-export commonly used types for convenience
pub use auth::{AuthError, Authenticator, FixedThresholdLockout, LockoutPolicy};
pub use context::AppContext;
pub use error::{CmeError, CmeResult, ValidationError};
pub use model::{
    Certificate, ComplianceCycle, CompliancePolicy, Department, NewCertificate, NewUser, Role,
    Title, User, UserStatus,
};
pub use report::{Report, ReportKind, TimeFilter};
pub use service::{
    CategoryService, CertificateService, ImageUpload, SettingsService, UserAdminService,
};
pub use sharing::{AccessError, PublishedSnapshot, ResolvedSnapshot, SnapshotPublisher};
pub use storage::{Collection, DocumentKey, DocumentStore, InMemoryStore, StorageError};
