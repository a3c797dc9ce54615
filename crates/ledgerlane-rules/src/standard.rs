//! The standard rule set.

use ledgerlane_core::metrics::{DecisionEffect, PlayerMetrics};
use ledgerlane_core::outcomes::FlowClassification;
use tracing::debug;

use crate::audit::{self, AuditAssessment};
use crate::effects;
use crate::engine::RuleEngine;

/// Gross income credited at each annual settlement.
pub const ANNUAL_INCOME: i64 = 5_000_000;

/// The rule set the server ships with.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RuleEngine for StandardRules {
    fn initial_metrics(&self) -> PlayerMetrics {
        PlayerMetrics {
            cash: 1_000_000,
            compliance: 60,
            risk: 20,
            transparency: 60,
            risk_tolerance: 50,
            tax_reserve: 0,
            position: 0,
            year: 1,
            settled_this_year: false,
            updated_at: None,
        }
    }

    fn decision_effect(&self, grid_type: &str, choice: &str) -> DecisionEffect {
        effects::lookup(grid_type, choice)
    }

    fn apply_decision_effect(
        &self,
        metrics: &PlayerMetrics,
        effect: &DecisionEffect,
    ) -> PlayerMetrics {
        effects::apply(metrics, effect)
    }

    fn classify_flow(&self, compliance: i32, risk: i32) -> FlowClassification {
        if compliance >= 80 && risk <= 20 {
            FlowClassification::Compliant
        } else if compliance >= 50 && risk <= 50 {
            FlowClassification::Grey
        } else {
            FlowClassification::Violation
        }
    }

    fn tax_rate(&self, flow: FlowClassification) -> f64 {
        match flow {
            FlowClassification::Compliant => 0.25,
            FlowClassification::Grey => 0.38,
            FlowClassification::Violation => 0.55,
        }
    }

    fn audit_risk(&self, flow: FlowClassification) -> f64 {
        match flow {
            FlowClassification::Compliant => 0.05,
            FlowClassification::Grey => 0.35,
            FlowClassification::Violation => 0.65,
        }
    }

    fn is_bankrupt(&self, cash: i64) -> bool {
        cash < 0
    }

    fn should_trigger_criminal(&self, compliance: i32) -> bool {
        compliance < 0
    }

    fn annual_income(&self, _metrics: &PlayerMetrics) -> i64 {
        ANNUAL_INCOME
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn assess_audit(&self, metrics: &PlayerMetrics, income: i64) -> AuditAssessment {
        let (severity, share) = audit::grade(metrics.compliance);
        let penalty = (income as f64 * share).round() as i64;
        debug!(?severity, penalty, "audit assessed");
        AuditAssessment {
            severity,
            penalty,
            reason: audit::reason(metrics.compliance, metrics.risk).to_owned(),
            detected_issues: audit::detect_issues(metrics.compliance, metrics.risk),
        }
    }
}
