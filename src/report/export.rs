//! Report exporters: CSV and a minimal standalone HTML document.
//!
//! Pure formatting over a materialized [`Report`]; no I/O. Nested detail
//! and member lines are flattened as indented continuation rows so the
//! export carries the same information the interactive view shows.

use crate::report::materialize::{Column, Report, ReportRow};
use crate::report::aggregate::ComplianceStatus;

/// Render a report as CSV with a header row.
///
/// Fields containing commas, quotes or newlines are quoted per RFC 4180.
pub fn to_csv(report: &Report) -> String {
    let mut out = String::new();
    let header: Vec<String> = report.columns.iter().map(|c| c.label.clone()).collect();
    push_csv_row(&mut out, &header);
    for row in &report.rows {
        push_csv_row(&mut out, &cells(row, &report.columns));
        for continuation in continuation_lines(row) {
            push_csv_row(&mut out, &continuation);
        }
    }
    out
}

/// Render a report as a minimal self-contained HTML document.
pub fn to_html(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"vi\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&report.title)));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&report.title)));
    out.push_str("<table border=\"1\">\n<thead><tr>");
    for column in &report.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(&column.label)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &report.rows {
        out.push_str("<tr>");
        for cell in cells(row, &report.columns) {
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
        for continuation in continuation_lines(row) {
            out.push_str("<tr>");
            for cell in continuation {
                out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
            }
            out.push_str("</tr>\n");
        }
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Project a row onto the report's column keys.
fn cells(row: &ReportRow, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| cell(row, &column.key))
        .collect()
}

fn cell(row: &ReportRow, key: &str) -> String {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
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
            "display_name" => display_name.clone(),
            "department" => opt(department),
            "title" => opt(title),
            "total_credits" => format_credits(*total_credits),
            "required_credits" => format_credits(*required_credits),
            "status" => match status {
                ComplianceStatus::Met => "Đạt".to_string(),
                ComplianceStatus::Unmet => "Chưa đạt".to_string(),
            },
            _ => String::new(),
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
            "display_name" => display_name.clone(),
            "department" => opt(department),
            "title" => opt(title),
            "total_credits" => format_credits(*total_credits),
            "certificate_count" => certificate_count.to_string(),
            _ => String::new(),
        },
        ReportRow::CertificateDetail {
            display_name,
            department,
            certificate_name,
            credits,
            issued_on,
        } => match key {
            "display_name" => display_name.clone(),
            "department" => opt(department),
            "certificate_name" => certificate_name.clone(),
            "credits" => format_credits(*credits),
            "issued_on" => issued_on.format("%d/%m/%Y").to_string(),
            _ => String::new(),
        },
        ReportRow::Group {
            group_name,
            member_count,
            total_credits,
            ..
        } => match key {
            "group_name" => group_name.clone(),
            "member_count" => member_count.to_string(),
            "total_credits" => format_credits(*total_credits),
            _ => String::new(),
        },
    }
}

/// Indented continuation rows for nested lines.
fn continuation_lines(row: &ReportRow) -> Vec<Vec<String>> {
    match row {
        ReportRow::SummaryWithDetail { details, .. } => details
            .iter()
            .map(|line| {
                vec![
                    format!("  - {}", line.name),
                    String::new(),
                    String::new(),
                    format_credits(line.credits),
                    line.issued_on.format("%d/%m/%Y").to_string(),
                ]
            })
            .collect(),
        ReportRow::Group { members, .. } => members
            .iter()
            .map(|member| {
                vec![
                    format!("  - {}", member.display_name),
                    String::new(),
                    format_credits(member.total_credits),
                ]
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Credits print without a trailing `.0` for whole numbers.
fn format_credits(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn push_csv_row(out: &mut String, fields: &[String]) {
    let encoded: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
    out.push_str(&encoded.join(","));
    out.push_str("\r\n");
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
