//! Audit grading.

use ledgerlane_core::outcomes::{AuditOutcome, AuditSeverity};
use serde::Serialize;

/// The graded result of auditing one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditAssessment {
    /// Severity tier.
    pub severity: AuditSeverity,
    /// Penalty owed.
    pub penalty: i64,
    /// Why the audit reached this grade.
    pub reason: String,
    /// Specific findings; a clean audit lists a single pass note.
    pub detected_issues: Vec<String>,
}

impl AuditAssessment {
    /// Converts the assessment into the outcome recorded for the player.
    #[must_use]
    pub fn into_outcome(self, year: u32) -> AuditOutcome {
        AuditOutcome {
            year,
            triggered: true,
            severity: Some(self.severity),
            penalty_amount: (self.penalty > 0).then_some(self.penalty),
            violations: self.detected_issues,
        }
    }
}

/// Grades compliance into a severity tier and the share of income owed as penalty.
#[must_use]
pub fn grade(compliance: i32) -> (AuditSeverity, f64) {
    if compliance < 20 {
        (AuditSeverity::Criminal, 1.5)
    } else if compliance < 40 {
        (AuditSeverity::SeriousViolation, 0.5)
    } else if compliance < 70 {
        (AuditSeverity::LightViolation, 0.2)
    } else {
        (AuditSeverity::Passed, 0.0)
    }
}

/// Human-readable reason for an audit at the given compliance and risk.
#[must_use]
pub fn reason(compliance: i32, risk: i32) -> &'static str {
    if compliance < 20 {
        "severe compliance violation, possible criminal liability"
    } else if compliance < 40 {
        "serious violations found"
    } else if compliance < 70 {
        "minor violations found"
    } else if risk > 70 {
        "high risk profile flagged for review"
    } else {
        "routine audit"
    }
}

/// Issues detected at the given compliance and risk.
#[must_use]
pub fn detect_issues(compliance: i32, risk: i32) -> Vec<String> {
    let mut issues = Vec::new();
    if risk > 70 {
        issues.push("cash flow anomaly".to_owned());
    }
    if compliance < 40 {
        issues.push("irregular tax filings".to_owned());
    }
    if risk > 50 {
        issues.push("suspected inflated costs".to_owned());
    }
    if compliance < 60 {
        issues.push("payroll and social insurance issues".to_owned());
    }
    if issues.is_empty() {
        issues.push("audit passed".to_owned());
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_tiers() {
        assert_eq!(grade(10).0, AuditSeverity::Criminal);
        assert_eq!(grade(20).0, AuditSeverity::SeriousViolation);
        assert_eq!(grade(39).0, AuditSeverity::SeriousViolation);
        assert_eq!(grade(40).0, AuditSeverity::LightViolation);
        assert_eq!(grade(70).0, AuditSeverity::Passed);
    }

    #[test]
    fn test_clean_profile_reports_pass() {
        assert_eq!(detect_issues(90, 10), vec!["audit passed".to_owned()]);
        assert_eq!(reason(90, 10), "routine audit");
    }

    #[test]
    fn test_risky_profile_reports_every_issue() {
        let issues = detect_issues(30, 80);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0], "cash flow anomaly");
    }

    #[test]
    fn test_into_outcome_omits_zero_penalty() {
        let assessment = AuditAssessment {
            severity: AuditSeverity::Passed,
            penalty: 0,
            reason: "routine audit".to_owned(),
            detected_issues: vec!["audit passed".to_owned()],
        };

        let outcome = assessment.into_outcome(3);

        assert!(outcome.triggered);
        assert_eq!(outcome.year, 3);
        assert_eq!(outcome.penalty_amount, None);
        assert_eq!(outcome.severity, Some(AuditSeverity::Passed));
    }
}
