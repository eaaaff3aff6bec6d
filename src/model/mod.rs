//! Domain model for the CME tracker.
//!
//! This module provides the typed documents the application stores and
//! operates on: principals, certificates, organizational categories, the
//! compliance-cycle setting, shared report snapshots and audit entries.
//!
//! All wire shapes are serde-derived; enumerations are closed and use stable
//! lowercase wire names so documents written by one version remain readable
//! by the next.

pub mod audit;
pub mod category;
pub mod certificate;
pub mod settings;
pub mod snapshot;
pub mod user;

pub use audit::{AuditAction, AuditEntry};
pub use category::{Department, Title};
pub use certificate::{Certificate, ImageRef, NewCertificate};
pub use settings::{ComplianceCycle, CompliancePolicy};
pub use snapshot::ReportSnapshot;
pub use user::{NewUser, Role, User, UserStatus, UserUpdate};
