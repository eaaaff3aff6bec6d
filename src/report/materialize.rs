//! Report materialization: shaping aggregation results into fixed schemas.
//!
//! A materialized report is one of a closed set of shapes, each with its own
//! ordered column set and row variant. The materializer consumes the
//! aggregator's output and re-projects it; it never re-derives totals.
//!
//! Row shapes are a tagged sum type rather than one struct with optional
//! fields, so every consumer matches exhaustively and a new report kind
//! cannot silently fall through a presence check.

use crate::model::{Certificate, CompliancePolicy, Department, Title};
use crate::report::aggregate::{
    ComplianceStatus, GroupDimension, UserAggregate, evaluate_compliance, group_by,
};
use crate::report::collation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of report shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Per-user totals judged against the compliance target.
    Compliance,
    /// Per-user flat totals.
    Summary,
    /// Per-user totals with nested certificate lines.
    SummaryWithDetail,
    /// One row per certificate; users without certificates are omitted.
    Detailed,
    /// Users grouped by department.
    ByDepartment,
    /// Users grouped by title.
    ByTitle,
}

impl ReportKind {
    /// Default display title.
    pub fn display_title(self) -> &'static str {
        match self {
            ReportKind::Compliance => "Báo cáo tuân thủ chỉ tiêu",
            ReportKind::Summary => "Báo cáo tổng hợp",
            ReportKind::SummaryWithDetail => "Báo cáo tổng hợp kèm chi tiết",
            ReportKind::Detailed => "Báo cáo chi tiết chứng chỉ",
            ReportKind::ByDepartment => "Báo cáo theo khoa/phòng",
            ReportKind::ByTitle => "Báo cáo theo chức danh",
        }
    }

    /// Whether interactive column sorting applies to this kind.
    ///
    /// The grouped kinds and the per-certificate kind keep their fixed
    /// grouping order (group name ascending, member order as aggregated)
    /// regardless of any requested sort key. Carried over from the
    /// reference behavior as an intentional policy.
    pub fn is_sortable(self) -> bool {
        matches!(
            self,
            ReportKind::Compliance | ReportKind::Summary | ReportKind::SummaryWithDetail
        )
    }
}

/// One ordered column: field key plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// A certificate line nested under a summary or detail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateLine {
    pub name: String,
    pub credits: f64,
    pub issued_on: NaiveDate,
}

impl From<&Certificate> for CertificateLine {
    fn from(certificate: &Certificate) -> Self {
        Self {
            name: certificate.name.clone(),
            credits: certificate.credits,
            issued_on: certificate.issued_on,
        }
    }
}

/// A member line nested under a group row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub display_name: String,
    pub total_credits: f64,
}

/// One materialized row, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportRow {
    Compliance {
        user_id: String,
        display_name: String,
        department: Option<String>,
        title: Option<String>,
        total_credits: f64,
        required_credits: f64,
        status: ComplianceStatus,
    },
    Summary {
        user_id: String,
        display_name: String,
        department: Option<String>,
        title: Option<String>,
        total_credits: f64,
        certificate_count: usize,
    },
    SummaryWithDetail {
        user_id: String,
        display_name: String,
        department: Option<String>,
        title: Option<String>,
        total_credits: f64,
        certificate_count: usize,
        details: Vec<CertificateLine>,
    },
    CertificateDetail {
        display_name: String,
        department: Option<String>,
        certificate_name: String,
        credits: f64,
        issued_on: NaiveDate,
    },
    Group {
        group_name: String,
        member_count: usize,
        total_credits: f64,
        members: Vec<GroupMember>,
    },
}

/// A materialized report, ready for rendering, export or publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

/// Category lookups and policy needed to resolve names and targets.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub departments: &'a [Department],
    pub titles: &'a [Title],
    pub policy: &'a CompliancePolicy,
}

impl<'a> ReportContext<'a> {
    fn department_names(&self) -> HashMap<&'a str, &'a str> {
        self.departments
            .iter()
            .map(|d| (d.id.as_str(), d.name.as_str()))
            .collect()
    }

    fn title_names(&self) -> HashMap<&'a str, &'a str> {
        self.titles
            .iter()
            .map(|t| (t.id.as_str(), t.name.as_str()))
            .collect()
    }
}

/// Fixed ordered column set for a report kind.
pub fn columns_for(kind: ReportKind) -> Vec<Column> {
    match kind {
        ReportKind::Compliance => vec![
            Column::new("display_name", "Họ và tên"),
            Column::new("department", "Khoa/Phòng"),
            Column::new("title", "Chức danh"),
            Column::new("total_credits", "Số tiết tích lũy"),
            Column::new("required_credits", "Chỉ tiêu"),
            Column::new("status", "Trạng thái"),
        ],
        ReportKind::Summary => vec![
            Column::new("display_name", "Họ và tên"),
            Column::new("department", "Khoa/Phòng"),
            Column::new("title", "Chức danh"),
            Column::new("total_credits", "Số tiết tích lũy"),
            Column::new("certificate_count", "Số chứng chỉ"),
        ],
        ReportKind::SummaryWithDetail => vec![
            Column::new("display_name", "Họ và tên"),
            Column::new("department", "Khoa/Phòng"),
            Column::new("title", "Chức danh"),
            Column::new("total_credits", "Số tiết tích lũy"),
            Column::new("certificate_count", "Số chứng chỉ"),
        ],
        ReportKind::Detailed => vec![
            Column::new("display_name", "Họ và tên"),
            Column::new("department", "Khoa/Phòng"),
            Column::new("certificate_name", "Tên chứng chỉ"),
            Column::new("credits", "Số tiết"),
            Column::new("issued_on", "Ngày cấp"),
        ],
        ReportKind::ByDepartment => vec![
            Column::new("group_name", "Khoa/Phòng"),
            Column::new("member_count", "Số nhân viên"),
            Column::new("total_credits", "Tổng số tiết"),
        ],
        ReportKind::ByTitle => vec![
            Column::new("group_name", "Chức danh"),
            Column::new("member_count", "Số nhân viên"),
            Column::new("total_credits", "Tổng số tiết"),
        ],
    }
}

/// Shape aggregation output into the selected report kind.
pub fn materialize(
    kind: ReportKind,
    aggregates: &[UserAggregate<'_>],
    context: &ReportContext<'_>,
) -> Report {
    let departments = context.department_names();
    let titles = context.title_names();
    let resolve_department =
        |id: Option<&String>| id.map(|id| departments.get(id.as_str()).unwrap_or(&id.as_str()).to_string());
    let resolve_title =
        |id: Option<&String>| id.map(|id| titles.get(id.as_str()).unwrap_or(&id.as_str()).to_string());

    let rows = match kind {
        ReportKind::Compliance => aggregates
            .iter()
            .map(|aggregate| {
                let title = resolve_title(aggregate.user.title_id.as_ref());
                let outcome =
                    evaluate_compliance(title.as_deref(), aggregate.total_credits, context.policy);
                ReportRow::Compliance {
                    user_id: aggregate.user.id.clone(),
                    display_name: aggregate.user.display_name.clone(),
                    department: resolve_department(aggregate.user.department_id.as_ref()),
                    title,
                    total_credits: aggregate.total_credits,
                    required_credits: outcome.required,
                    status: outcome.status,
                }
            })
            .collect(),
        ReportKind::Summary => aggregates
            .iter()
            .map(|aggregate| ReportRow::Summary {
                user_id: aggregate.user.id.clone(),
                display_name: aggregate.user.display_name.clone(),
                department: resolve_department(aggregate.user.department_id.as_ref()),
                title: resolve_title(aggregate.user.title_id.as_ref()),
                total_credits: aggregate.total_credits,
                certificate_count: aggregate.certificates.len(),
            })
            .collect(),
        ReportKind::SummaryWithDetail => aggregates
            .iter()
            .map(|aggregate| ReportRow::SummaryWithDetail {
                user_id: aggregate.user.id.clone(),
                display_name: aggregate.user.display_name.clone(),
                department: resolve_department(aggregate.user.department_id.as_ref()),
                title: resolve_title(aggregate.user.title_id.as_ref()),
                total_credits: aggregate.total_credits,
                certificate_count: aggregate.certificates.len(),
                details: aggregate.certificates.iter().map(|c| (*c).into()).collect(),
            })
            .collect(),
        ReportKind::Detailed => {
            // Zero-certificate users have nothing to enumerate and are
            // omitted from this kind only.
            let mut with_certs: Vec<&UserAggregate<'_>> = aggregates
                .iter()
                .filter(|a| !a.certificates.is_empty())
                .collect();
            with_certs.sort_by(|a, b| {
                collation::compare(&a.user.display_name, &b.user.display_name)
            });
            with_certs
                .iter()
                .flat_map(|aggregate| {
                    let department = resolve_department(aggregate.user.department_id.as_ref());
                    aggregate.certificates.iter().map(move |certificate| {
                        ReportRow::CertificateDetail {
                            display_name: aggregate.user.display_name.clone(),
                            department: department.clone(),
                            certificate_name: certificate.name.clone(),
                            credits: certificate.credits,
                            issued_on: certificate.issued_on,
                        }
                    })
                })
                .collect()
        }
        ReportKind::ByDepartment => {
            grouped_rows(aggregates, GroupDimension::Department, &departments)
        }
        ReportKind::ByTitle => grouped_rows(aggregates, GroupDimension::Title, &titles),
    };

    Report {
        kind,
        title: kind.display_title().to_string(),
        columns: columns_for(kind),
        rows,
    }
}

fn grouped_rows(
    aggregates: &[UserAggregate<'_>],
    dimension: GroupDimension,
    names: &HashMap<&str, &str>,
) -> Vec<ReportRow> {
    let mut groups = group_by(aggregates, dimension);
    // Group name ascending under Vietnamese collation; member order stays
    // as produced by the aggregator.
    groups.sort_by(|a, b| {
        let name_a = *names.get(a.category_id.as_str()).unwrap_or(&a.category_id.as_str());
        let name_b = *names.get(b.category_id.as_str()).unwrap_or(&b.category_id.as_str());
        collation::compare(name_a, name_b)
    });
    groups
        .into_iter()
        .map(|group| {
            let group_name = names
                .get(group.category_id.as_str())
                .map(|name| name.to_string())
                .unwrap_or_else(|| group.category_id.clone());
            ReportRow::Group {
                group_name,
                member_count: group.members.len(),
                total_credits: group.total_credits,
                members: group
                    .members
                    .iter()
                    .map(|member| GroupMember {
                        display_name: member.user.display_name.clone(),
                        total_credits: member.total_credits,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Requested direction for interactive sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sortable projection of one row field.
enum SortValue {
    Text(String),
    Number(f64),
}

fn sort_value(row: &ReportRow, key: &str) -> Option<SortValue> {
    let text = |s: &str| Some(SortValue::Text(s.to_string()));
    let opt_text = |s: &Option<String>| Some(SortValue::Text(s.clone().unwrap_or_default()));
    match row {
        ReportRow::Compliance {
            display_name,
            department,
            title,
            total_credits,
            required_credits,
            status,
            ..
        } => match key {
            "display_name" => text(display_name),
            "department" => opt_text(department),
            "title" => opt_text(title),
            "total_credits" => Some(SortValue::Number(*total_credits)),
            "required_credits" => Some(SortValue::Number(*required_credits)),
            "status" => Some(SortValue::Number(match status {
                ComplianceStatus::Met => 1.0,
                ComplianceStatus::Unmet => 0.0,
            })),
            _ => None,
        },
        ReportRow::Summary {
            display_name,
            department,
            title,
            total_credits,
            certificate_count,
            ..
        }
        | ReportRow::SummaryWithDetail {
            display_name,
            department,
            title,
            total_credits,
            certificate_count,
            ..
        } => match key {
            "display_name" => text(display_name),
            "department" => opt_text(department),
            "title" => opt_text(title),
            "total_credits" => Some(SortValue::Number(*total_credits)),
            "certificate_count" => Some(SortValue::Number(*certificate_count as f64)),
            _ => None,
        },
        // Fixed-order shapes never reach the comparator.
        ReportRow::CertificateDetail { .. } | ReportRow::Group { .. } => None,
    }
}

/// Sort a report's rows by a column key.
///
/// Returns `true` when the sort was applied. Non-sortable kinds and unknown
/// column keys leave the report untouched and return `false`.
pub fn sort_rows(report: &mut Report, key: &str, direction: SortDirection) -> bool {
    if !report.kind.is_sortable() {
        return false;
    }
    if !report.columns.iter().any(|c| c.key == key) {
        return false;
    }
    report.rows.sort_by(|a, b| {
        let ordering = match (sort_value(a, key), sort_value(b, key)) {
            (Some(SortValue::Text(a)), Some(SortValue::Text(b))) => collation::compare(&a, &b),
            (Some(SortValue::Number(a)), Some(SortValue::Number(b))) => {
                a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
            }
            _ => std::cmp::Ordering::Equal,
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    true
}
