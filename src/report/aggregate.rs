//! Pure aggregation over certificate records.
//!
//! Everything in this module is side-effect free: no I/O, no clock reads,
//! no logging on the happy path. The functions take slices and references
//! and produce owned aggregation results, so they are trivially testable
//! and deterministic.

use crate::model::{Certificate, CompliancePolicy, User};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Time window selecting which certificates count toward a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFilter {
    /// Keep certificates whose issue date's UTC year equals the given year.
    ExactYear(i32),
    /// Keep everything.
    AllTime,
    /// Keep certificates issued within `[start, end]`, both bounds
    /// inclusive for the whole day in UTC. A missing bound yields the
    /// empty set: the filter fails closed rather than silently widening.
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl TimeFilter {
    /// Whether one certificate passes the filter.
    pub fn matches(&self, certificate: &Certificate) -> bool {
        match self {
            TimeFilter::ExactYear(year) => certificate.issued_on.year() == *year,
            TimeFilter::AllTime => true,
            TimeFilter::Range { start, end } => match (start, end) {
                (Some(start), Some(end)) => {
                    certificate.issued_on >= *start && certificate.issued_on <= *end
                }
                // Fail closed on a half-open range.
                _ => false,
            },
        }
    }
}

/// Filter certificates by a time window.
///
/// Idempotent: applying the same filter to its own output is a no-op.
pub fn filter_by_time<'a>(
    certificates: &'a [Certificate],
    filter: &TimeFilter,
) -> Vec<&'a Certificate> {
    certificates.iter().filter(|c| filter.matches(c)).collect()
}

/// Sum credit values per owning principal. Each record contributes once.
pub fn sum_by_user<'a>(
    certificates: impl IntoIterator<Item = &'a Certificate>,
) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for certificate in certificates {
        *totals.entry(certificate.user_id.clone()).or_insert(0.0) += certificate.credits;
    }
    totals
}

/// Compliance verdict for one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Met,
    Unmet,
}

/// Required target and verdict for one principal's total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceOutcome {
    pub required: f64,
    pub status: ComplianceStatus,
}

/// Judge a credit total against the policy's target for a title.
///
/// Pure and deterministic: `Met` iff `total >= required`, where `required`
/// is the lowered target iff the title name equals the policy's exempt
/// title.
pub fn evaluate_compliance(
    title_name: Option<&str>,
    total_credits: f64,
    policy: &CompliancePolicy,
) -> ComplianceOutcome {
    let required = policy.target_for_title(title_name);
    let status = if total_credits >= required {
        ComplianceStatus::Met
    } else {
        ComplianceStatus::Unmet
    };
    ComplianceOutcome { required, status }
}

/// Per-principal aggregation result: the member rows of every report shape.
#[derive(Debug, Clone)]
pub struct UserAggregate<'a> {
    pub user: &'a User,
    /// Certificates in the filtered window, in input order.
    pub certificates: Vec<&'a Certificate>,
    pub total_credits: f64,
}

/// Aggregate filtered certificates under their owning principals.
///
/// Every user appears, including those with zero qualifying certificates.
/// Certificates referencing a user not present in `users` are dropped here
/// without an error; the loader already warned about them.
pub fn aggregate_users<'a>(
    users: &'a [User],
    certificates: &[&'a Certificate],
) -> Vec<UserAggregate<'a>> {
    let mut by_user: HashMap<&str, Vec<&'a Certificate>> = HashMap::new();
    for certificate in certificates {
        by_user
            .entry(certificate.user_id.as_str())
            .or_default()
            .push(certificate);
    }
    users
        .iter()
        .map(|user| {
            let certificates = by_user.remove(user.id.as_str()).unwrap_or_default();
            let total_credits = certificates.iter().map(|c| c.credits).sum();
            UserAggregate {
                user,
                certificates,
                total_credits,
            }
        })
        .collect()
}

/// Dimension to group per-user aggregates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    Department,
    Title,
}

/// One group of user aggregates sharing a category.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub category_id: String,
    pub members: Vec<UserAggregate<'a>>,
    pub total_credits: f64,
}

/// Group user aggregates by the referenced category id.
///
/// Users without the dimension's category reference are dropped silently:
/// groups are keyed by category ids present on the user record. Ordering of
/// the returned groups is unspecified here; display ordering (Vietnamese
/// collation on the category name) is applied at materialization.
pub fn group_by<'a>(
    aggregates: &[UserAggregate<'a>],
    dimension: GroupDimension,
) -> Vec<Group<'a>> {
    let mut groups: HashMap<String, Group<'a>> = HashMap::new();
    for aggregate in aggregates {
        let category_id = match dimension {
            GroupDimension::Department => aggregate.user.department_id.as_ref(),
            GroupDimension::Title => aggregate.user.title_id.as_ref(),
        };
        let Some(category_id) = category_id else {
            continue;
        };
        let group = groups
            .entry(category_id.clone())
            .or_insert_with(|| Group {
                category_id: category_id.clone(),
                members: Vec::new(),
                total_credits: 0.0,
            });
        group.members.push(aggregate.clone());
        group.total_credits += aggregate.total_credits;
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCertificate, NewUser, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cert(user_id: &str, credits: f64, issued_on: NaiveDate) -> Certificate {
        Certificate::new(
            NewCertificate {
                name: "CME".into(),
                credits,
                issued_on,
            },
            user_id.into(),
            None,
        )
    }

    fn user(id: &str, department_id: Option<&str>, title_id: Option<&str>) -> User {
        let mut user = User::new(
            NewUser {
                username: id.into(),
                display_name: format!("User {id}"),
                password: "unused".into(),
                role: Role::Staff,
                department_id: department_id.map(String::from),
                title_id: title_id.map(String::from),
            },
            "hash".into(),
        );
        user.id = id.into();
        user
    }

    #[test]
    fn test_exact_year_filter() {
        let certs = vec![
            cert("u", 1.0, date(2022, 5, 1)),
            cert("u", 2.0, date(2023, 1, 1)),
            cert("u", 3.0, date(2023, 12, 31)),
        ];
        let kept = filter_by_time(&certs, &TimeFilter::ExactYear(2023));
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|c| c.issued_on.year() == 2023));
    }

    #[test]
    fn test_range_filter_inclusive_bounds() {
        let certs = vec![
            cert("u", 1.0, date(2023, 1, 1)),
            cert("u", 2.0, date(2023, 6, 15)),
            cert("u", 3.0, date(2023, 12, 31)),
            cert("u", 4.0, date(2024, 1, 1)),
        ];
        let filter = TimeFilter::Range {
            start: Some(date(2023, 1, 1)),
            end: Some(date(2023, 12, 31)),
        };
        let kept = filter_by_time(&certs, &filter);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_range_filter_fails_closed_on_missing_bound() {
        let certs = vec![cert("u", 1.0, date(2023, 6, 15))];
        for filter in [
            TimeFilter::Range {
                start: None,
                end: Some(date(2023, 12, 31)),
            },
            TimeFilter::Range {
                start: Some(date(2023, 1, 1)),
                end: None,
            },
            TimeFilter::Range {
                start: None,
                end: None,
            },
        ] {
            assert!(filter_by_time(&certs, &filter).is_empty());
        }
    }

    #[test]
    fn test_sum_by_user_counts_each_record_once() {
        let certs = vec![
            cert("u1", 40.0, date(2022, 3, 1)),
            cert("u1", 50.0, date(2023, 3, 1)),
            cert("u2", 5.0, date(2023, 3, 1)),
        ];
        let totals = sum_by_user(certs.iter());
        assert_eq!(totals["u1"], 90.0);
        assert_eq!(totals["u2"], 5.0);
    }

    #[test]
    fn test_evaluate_compliance_boundary() {
        let policy = CompliancePolicy::default();
        let at = evaluate_compliance(Some("Bác sĩ"), 120.0, &policy);
        assert_eq!(at.status, ComplianceStatus::Met);
        assert_eq!(at.required, 120.0);

        let below = evaluate_compliance(Some("Bác sĩ"), 119.99, &policy);
        assert_eq!(below.status, ComplianceStatus::Unmet);
    }

    #[test]
    fn test_exempt_title_lowered_target() {
        let policy = CompliancePolicy::default();
        let outcome = evaluate_compliance(Some("Dược sĩ trung học"), 8.0, &policy);
        assert_eq!(outcome.required, 8.0);
        assert_eq!(outcome.status, ComplianceStatus::Met);

        let zero = evaluate_compliance(Some("Dược sĩ trung học"), 0.0, &policy);
        assert_eq!(zero.status, ComplianceStatus::Unmet);
    }

    #[test]
    fn test_aggregate_includes_zero_total_users() {
        let users = vec![user("u1", None, None), user("u2", None, None)];
        let certs = vec![cert("u1", 10.0, date(2023, 1, 1))];
        let refs: Vec<&Certificate> = certs.iter().collect();
        let aggregates = aggregate_users(&users, &refs);

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].total_credits, 10.0);
        assert_eq!(aggregates[1].total_credits, 0.0);
        assert!(aggregates[1].certificates.is_empty());
    }

    #[test]
    fn test_aggregate_drops_unknown_owner() {
        let users = vec![user("u1", None, None)];
        let certs = vec![
            cert("u1", 10.0, date(2023, 1, 1)),
            cert("ghost", 99.0, date(2023, 1, 1)),
        ];
        let refs: Vec<&Certificate> = certs.iter().collect();
        let aggregates = aggregate_users(&users, &refs);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].total_credits, 10.0);
    }

    #[test]
    fn test_group_by_department_totals() {
        let users = vec![
            user("u1", Some("dA"), None),
            user("u2", Some("dA"), None),
            user("u3", Some("dB"), None),
            user("u4", None, None),
        ];
        let certs = vec![
            cert("u1", 10.0, date(2023, 1, 1)),
            cert("u2", 20.0, date(2023, 1, 1)),
            cert("u3", 5.0, date(2023, 1, 1)),
        ];
        let refs: Vec<&Certificate> = certs.iter().collect();
        let aggregates = aggregate_users(&users, &refs);
        let mut groups = group_by(&aggregates, GroupDimension::Department);
        groups.sort_by(|a, b| a.category_id.cmp(&b.category_id));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category_id, "dA");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].total_credits, 30.0);
        assert_eq!(groups[1].category_id, "dB");
        assert_eq!(groups[1].total_credits, 5.0);
    }
}
