//! Reporting pipeline: load, aggregate, materialize, export.
//!
//! The pipeline is a straight line with one I/O stage at the front:
//!
//! ```text
//! DataLoader -> aggregate (pure) -> materialize (pure) -> render/export/publish
//! ```
//!
//! [`loader`] fetches the users and certificates visible to the acting
//! principal. [`aggregate`] filters by time window, sums credit values per
//! principal and judges compliance. [`materialize`] projects the result
//! into one of the closed set of report shapes. [`export`] renders a
//! materialized report to CSV or HTML; publication as a shareable snapshot
//! lives in [`crate::sharing`].

pub mod aggregate;
pub mod collation;
pub mod export;
pub mod loader;
pub mod materialize;

pub use aggregate::{
    ComplianceOutcome, ComplianceStatus, Group, GroupDimension, TimeFilter, UserAggregate,
    aggregate_users, evaluate_compliance, filter_by_time, group_by, sum_by_user,
};
pub use export::{to_csv, to_html};
pub use loader::{DataLoader, LoadedData, VisibilityScope};
pub use materialize::{
    CertificateLine, Column, GroupMember, Report, ReportContext, ReportKind, ReportRow,
    SortDirection, columns_for, materialize, sort_rows,
};
