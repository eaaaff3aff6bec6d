//! Compliance-cycle setting and threshold policy.

use serde::{Deserialize, Serialize};

/// Singleton setting defining the year window over which credit totals are
/// judged. Mutated only by administrators; read-only for the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCycle {
    pub start_year: i32,
    pub end_year: i32,
}

impl ComplianceCycle {
    /// Whether a calendar year falls inside the cycle (inclusive bounds).
    pub fn contains_year(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }
}

impl Default for ComplianceCycle {
    fn default() -> Self {
        Self {
            start_year: 2022,
            end_year: 2026,
        }
    }
}

/// Credit targets keyed by title.
///
/// One distinguished title value carries a lowered target; every other title
/// uses the standard one. Thresholds live here rather than at call sites so
/// product can retune them without touching the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompliancePolicy {
    pub standard_target: f64,
    pub exempt_target: f64,
    /// Display name of the title that maps to the lowered target.
    pub exempt_title: String,
}

impl CompliancePolicy {
    /// The credit target for a principal holding the given title name.
    pub fn target_for_title(&self, title_name: Option<&str>) -> f64 {
        match title_name {
            Some(name) if name == self.exempt_title => self.exempt_target,
            _ => self.standard_target,
        }
    }
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self {
            standard_target: 120.0,
            exempt_target: 8.0,
            exempt_title: "Dược sĩ trung học".to_string(),
        }
    }
}
