//! Decision effect table and effect application.

use ledgerlane_core::metrics::{DecisionEffect, PlayerMetrics};

const fn effect(cash: i64, compliance: i32, transparency: i32, risk: i32) -> DecisionEffect {
    DecisionEffect {
        cash,
        compliance,
        risk,
        transparency,
        tax_reserve: 0,
    }
}

/// Effect of `choice` on a cell of `grid_type`. Unknown pairs have no effect.
#[must_use]
pub fn lookup(grid_type: &str, choice: &str) -> DecisionEffect {
    match (grid_type, choice) {
        ("procurement", "A") => effect(-5, 10, 12, 0),
        ("procurement", "B") => effect(50_000, -3, -8, 15),
        ("procurement", "C") => effect(200_000, -15, 0, 50),
        ("procurement", "D") => effect(30_000, -2, -5, 10),
        ("procurement", "E") => effect(0, 0, 0, 8),
        ("sales", "A") => effect(0, 8, 12, 0),
        ("sales", "B") => effect(300_000, -12, -15, 45),
        _ => DecisionEffect::default(),
    }
}

/// Clamps compliance, risk and transparency to `[0, 100]`; adds cash
/// unclamped; floors the tax reserve at zero.
#[must_use]
pub fn apply(metrics: &PlayerMetrics, effect: &DecisionEffect) -> PlayerMetrics {
    PlayerMetrics {
        cash: metrics.cash + effect.cash,
        compliance: (metrics.compliance + effect.compliance).clamp(0, 100),
        risk: (metrics.risk + effect.risk).clamp(0, 100),
        transparency: (metrics.transparency + effect.transparency).clamp(0, 100),
        tax_reserve: (metrics.tax_reserve + effect.tax_reserve).max(0),
        ..metrics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_choice() {
        let e = lookup("sales", "B");
        assert_eq!(e.cash, 300_000);
        assert_eq!(e.compliance, -12);
        assert_eq!(e.transparency, -15);
        assert_eq!(e.risk, 45);
    }

    #[test]
    fn test_lookup_unknown_choice_has_no_effect() {
        assert_eq!(lookup("sales", "Z"), DecisionEffect::default());
        assert_eq!(lookup("lottery", "A"), DecisionEffect::default());
    }

    #[test]
    fn test_apply_clamps_bounded_metrics() {
        let metrics = PlayerMetrics {
            cash: 10,
            compliance: 95,
            risk: 3,
            transparency: 50,
            tax_reserve: 5,
            ..PlayerMetrics::default()
        };
        let delta = DecisionEffect {
            cash: -100,
            compliance: 20,
            risk: -10,
            transparency: 0,
            tax_reserve: -20,
        };

        let next = apply(&metrics, &delta);

        assert_eq!(next.cash, -90);
        assert_eq!(next.compliance, 100);
        assert_eq!(next.risk, 0);
        assert_eq!(next.transparency, 50);
        assert_eq!(next.tax_reserve, 0);
    }

    #[test]
    fn test_apply_leaves_untouched_fields() {
        let metrics = PlayerMetrics {
            position: 7,
            year: 4,
            settled_this_year: true,
            ..PlayerMetrics::default()
        };

        let next = apply(&metrics, &lookup("procurement", "E"));

        assert_eq!(next.position, 7);
        assert_eq!(next.year, 4);
        assert!(next.settled_this_year);
        assert_eq!(next.risk, 8);
    }
}
