// =============================================================================
// Weight Rebalancer — Regime derivation and weight redistribution
// =============================================================================
//
// Pure table lookup plus renormalization. The regime overrides live in the
// rule document; this module only selects one and folds in the edge-case
// exclusions:
//
//   1. Pick the override vector for the derived regime (base under Neutral).
//   2. Zero out every factor an edge-case mode excluded.
//   3. Renormalize so the active vector sums to 1.0 again.
//
// The output is non-negative and sums to 1.0 within tolerance, except in the
// degenerate case where every factor is excluded (all-zero vector; the
// aggregator falls back to the neutral midpoint).
// =============================================================================

use tracing::debug;

use crate::rules::RuleSet;
use crate::types::{Factor, MarketContext, Regime, WeightVector};

/// Derive the market regime from the dominance indicator. An absent
/// indicator reads as Neutral.
pub fn derive_regime(context: &MarketContext, rules: &RuleSet) -> Regime {
    let Some(dominance) = context.btc_dominance_pct else {
        return Regime::Neutral;
    };
    if !dominance.is_finite() {
        return Regime::Neutral;
    }

    if dominance < rules.regime.bull_dominance_below {
        Regime::Bull
    } else if dominance > rules.regime.bear_dominance_above {
        Regime::Bear
    } else {
        Regime::Neutral
    }
}

/// Compute the active weight vector for a request: regime override with the
/// excluded factors zeroed out, renormalized to sum 1.0.
pub fn active_weights(rules: &RuleSet, regime: Regime, excluded: &[Factor]) -> WeightVector {
    let mut weights = *rules.weights_for_regime(regime);

    for &factor in excluded {
        *weights.get_mut(factor) = 0.0;
    }

    let rebalanced = weights.normalized();

    if !excluded.is_empty() {
        debug!(
            regime = %regime,
            excluded = ?excluded,
            sum = rebalanced.sum(),
            "weights redistributed after factor exclusion"
        );
    }

    rebalanced
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::WEIGHT_SUM_TOLERANCE;

    fn ctx(dominance: Option<f64>) -> MarketContext {
        MarketContext {
            btc_dominance_pct: dominance,
            total_market_cap_usd: None,
        }
    }

    #[test]
    fn regime_thresholds() {
        let rules = RuleSet::default();
        assert_eq!(derive_regime(&ctx(Some(40.0)), &rules), Regime::Bull);
        assert_eq!(derive_regime(&ctx(Some(60.0)), &rules), Regime::Bear);
        assert_eq!(derive_regime(&ctx(Some(50.0)), &rules), Regime::Neutral);
        // Boundary values are not strictly below/above — neutral.
        assert_eq!(derive_regime(&ctx(Some(45.0)), &rules), Regime::Neutral);
        assert_eq!(derive_regime(&ctx(Some(55.0)), &rules), Regime::Neutral);
    }

    #[test]
    fn absent_dominance_defaults_to_neutral() {
        let rules = RuleSet::default();
        assert_eq!(derive_regime(&ctx(None), &rules), Regime::Neutral);
        assert_eq!(
            derive_regime(&ctx(Some(f64::NAN)), &rules),
            Regime::Neutral
        );
    }

    #[test]
    fn neutral_regime_uses_base_weights() {
        let rules = RuleSet::default();
        let w = active_weights(&rules, Regime::Neutral, &[]);
        assert!((w.fundamentals - 0.25).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((w.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn regime_override_sums_to_one() {
        let rules = RuleSet::default();
        for regime in [Regime::Bull, Regime::Bear, Regime::Neutral] {
            let w = active_weights(&rules, regime, &[]);
            assert!((w.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
    }

    #[test]
    fn exclusion_redistributes_proportionally() {
        let rules = RuleSet::default();
        let w = active_weights(&rules, Regime::Neutral, &[Factor::Technicals]);
        assert_eq!(w.technicals, 0.0);
        assert!((w.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        // 0.25 / 0.75 each for the three survivors.
        assert!((w.fundamentals - 1.0 / 3.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn regime_override_composes_with_exclusion() {
        let rules = RuleSet::default();
        let w = active_weights(&rules, Regime::Bull, &[Factor::Technicals]);
        assert_eq!(w.technicals, 0.0);
        assert!((w.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        // Bull still favours smart-money among the survivors.
        assert!(w.smart_money > w.fundamentals);
    }

    #[test]
    fn all_factors_excluded_yields_zero_vector() {
        let rules = RuleSet::default();
        let w = active_weights(&rules, Regime::Neutral, &Factor::ALL);
        assert_eq!(w.sum(), 0.0);
    }
}
