//! Per-player metrics mirrored by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical numeric state of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMetrics {
    /// Cash on hand. May go negative (bankruptcy).
    pub cash: i64,
    /// Compliance awareness, 0–100.
    pub compliance: i32,
    /// Risk score, 0–100.
    pub risk: i32,
    /// Financial transparency, 0–100.
    pub transparency: i32,
    /// Risk tolerance, 0–100.
    pub risk_tolerance: i32,
    /// Tax reserve; never negative.
    pub tax_reserve: i64,
    /// Board position.
    pub position: u32,
    /// The year this player last acted in.
    pub year: u32,
    /// Whether this player has completed annual settlement for the current year.
    pub settled_this_year: bool,
    /// When the mirror entry was last written.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A partial update merged field-by-field into [`PlayerMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsPatch {
    pub cash: Option<i64>,
    pub compliance: Option<i32>,
    pub risk: Option<i32>,
    pub transparency: Option<i32>,
    pub risk_tolerance: Option<i32>,
    pub tax_reserve: Option<i64>,
    pub position: Option<u32>,
    pub year: Option<u32>,
    pub settled_this_year: Option<bool>,
}

impl MetricsPatch {
    /// A patch that overwrites every field with the values in `metrics`.
    #[must_use]
    pub fn replacing(metrics: &PlayerMetrics) -> Self {
        Self {
            cash: Some(metrics.cash),
            compliance: Some(metrics.compliance),
            risk: Some(metrics.risk),
            transparency: Some(metrics.transparency),
            risk_tolerance: Some(metrics.risk_tolerance),
            tax_reserve: Some(metrics.tax_reserve),
            position: Some(metrics.position),
            year: Some(metrics.year),
            settled_this_year: Some(metrics.settled_this_year),
        }
    }

    /// Merges the present fields into `metrics`.
    pub fn apply_to(&self, metrics: &mut PlayerMetrics) {
        if let Some(cash) = self.cash {
            metrics.cash = cash;
        }
        if let Some(compliance) = self.compliance {
            metrics.compliance = compliance;
        }
        if let Some(risk) = self.risk {
            metrics.risk = risk;
        }
        if let Some(transparency) = self.transparency {
            metrics.transparency = transparency;
        }
        if let Some(risk_tolerance) = self.risk_tolerance {
            metrics.risk_tolerance = risk_tolerance;
        }
        if let Some(tax_reserve) = self.tax_reserve {
            metrics.tax_reserve = tax_reserve;
        }
        if let Some(position) = self.position {
            metrics.position = position;
        }
        if let Some(year) = self.year {
            metrics.year = year;
        }
        if let Some(settled) = self.settled_this_year {
            metrics.settled_this_year = settled;
        }
    }
}

/// Deltas produced by a decision, applied by the rule engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionEffect {
    pub cash: i64,
    pub compliance: i32,
    pub risk: i32,
    pub transparency: i32,
    pub tax_reserve: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut metrics = PlayerMetrics {
            cash: 100,
            compliance: 50,
            risk: 10,
            ..PlayerMetrics::default()
        };
        let patch = MetricsPatch {
            cash: Some(250),
            settled_this_year: Some(true),
            ..MetricsPatch::default()
        };

        patch.apply_to(&mut metrics);

        assert_eq!(metrics.cash, 250);
        assert_eq!(metrics.compliance, 50);
        assert_eq!(metrics.risk, 10);
        assert!(metrics.settled_this_year);
    }

    #[test]
    fn test_replacing_patch_reproduces_source_metrics() {
        let source = PlayerMetrics {
            cash: -40,
            compliance: 70,
            risk: 33,
            transparency: 12,
            risk_tolerance: 5,
            tax_reserve: 9,
            position: 18,
            year: 3,
            settled_this_year: true,
            updated_at: None,
        };
        let mut target = PlayerMetrics::default();

        MetricsPatch::replacing(&source).apply_to(&mut target);

        assert_eq!(target, source);
    }

    #[test]
    fn test_patch_deserializes_from_sparse_json() {
        let patch: MetricsPatch =
            serde_json::from_value(serde_json::json!({ "cash": 10, "position": 4 })).unwrap();

        assert_eq!(patch.cash, Some(10));
        assert_eq!(patch.position, Some(4));
        assert_eq!(patch.risk, None);
    }
}
