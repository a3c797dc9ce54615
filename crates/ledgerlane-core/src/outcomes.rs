//! Settlement and audit outcomes exchanged between the rule engine and the
//! coordination services.

use serde::{Deserialize, Serialize};

/// Classification of a player's money flow, which drives tax rate and audit risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowClassification {
    Compliant,
    Grey,
    Violation,
}

/// Figures computed for one player's annual settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementFigures {
    pub year: u32,
    pub total_income: i64,
    pub taxable_income: i64,
    pub tax_rate: f64,
    pub tax_amount: i64,
    pub flow_type: FlowClassification,
    pub final_balance: i64,
}

/// Severity tier of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Passed,
    LightViolation,
    SeriousViolation,
    Criminal,
}

/// An audit outcome as reported to the coordination layer.
///
/// Audits are triggered and parameterized outside the core; the core only
/// records them and debits `penalty_amount` from the player's cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub year: u32,
    pub triggered: bool,
    #[serde(default)]
    pub severity: Option<AuditSeverity>,
    #[serde(default)]
    pub penalty_amount: Option<i64>,
    #[serde(default)]
    pub violations: Vec<String>,
}
