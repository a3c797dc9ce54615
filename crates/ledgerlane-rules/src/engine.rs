//! The rule engine contract.

use ledgerlane_core::metrics::{DecisionEffect, PlayerMetrics};
use ledgerlane_core::outcomes::{FlowClassification, SettlementFigures};

use crate::audit::AuditAssessment;

/// Pure game-rule computations consumed by the flow orchestrator.
///
/// Implementations must be deterministic given their inputs; randomness
/// enters only through the `sample` argument of [`RuleEngine::should_trigger_audit`].
pub trait RuleEngine: Send + Sync {
    /// Metrics a player starts the game with.
    fn initial_metrics(&self) -> PlayerMetrics;

    /// Looks up the effect of choosing `choice` on a grid cell of `grid_type`.
    /// Unknown combinations have no effect.
    fn decision_effect(&self, grid_type: &str, choice: &str) -> DecisionEffect;

    /// Applies `effect` to `metrics`, returning the new metrics.
    fn apply_decision_effect(&self, metrics: &PlayerMetrics, effect: &DecisionEffect)
    -> PlayerMetrics;

    /// Classifies a player's money flow.
    fn classify_flow(&self, compliance: i32, risk: i32) -> FlowClassification;

    /// Tax rate for a flow classification.
    fn tax_rate(&self, flow: FlowClassification) -> f64;

    /// Probability that a player with this classification is audited.
    fn audit_risk(&self, flow: FlowClassification) -> f64;

    /// Whether an audit fires for a uniform `sample` in `[0, 1)`.
    fn should_trigger_audit(&self, flow: FlowClassification, sample: f64) -> bool {
        sample < self.audit_risk(flow)
    }

    /// Whether `cash` means the player is bankrupt.
    fn is_bankrupt(&self, cash: i64) -> bool;

    /// Whether `compliance` is low enough for criminal liability.
    fn should_trigger_criminal(&self, compliance: i32) -> bool;

    /// Gross income credited at annual settlement.
    fn annual_income(&self, metrics: &PlayerMetrics) -> i64;

    /// Computes a player's annual settlement for `year`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn settle_year(&self, metrics: &PlayerMetrics, year: u32) -> SettlementFigures {
        let total_income = self.annual_income(metrics);
        let flow_type = self.classify_flow(metrics.compliance, metrics.risk);
        let tax_rate = self.tax_rate(flow_type);
        let tax_amount = (total_income as f64 * tax_rate).round() as i64;
        SettlementFigures {
            year,
            total_income,
            taxable_income: total_income,
            tax_rate,
            tax_amount,
            flow_type,
            final_balance: metrics.cash + total_income - tax_amount,
        }
    }

    /// Grades an audit of a player with the given metrics and income.
    fn assess_audit(&self, metrics: &PlayerMetrics, income: i64) -> AuditAssessment;
}
