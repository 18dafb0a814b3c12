// =============================================================================
// Aggregator — Weighted combination, penalties, confidence
// =============================================================================
//
// Combines the normalized factor scores under the active weight vector and
// produces the final integer grade plus a confidence measure.
//
// Weighting contract: only usable factors (available and not mode-excluded)
// contribute, with their weights renormalized over the usable subset. A
// missing factor contributes neither value nor weight — it is never treated
// as zero. With no usable factor at all the score falls back to the neutral
// midpoint (missing data never raises).
//
// Confidence is a function of data availability and quality only, never of
// the score's magnitude: a well-supported 50 reports higher confidence than
// a thinly-supported 80.
// =============================================================================

use crate::engine::edge_cases::Adjustment;
use crate::rules::RuleSet;
use crate::types::{FactorScore, FactorSet, WeightVector};

/// Score reported when no factor is usable at all.
const NEUTRAL_MIDPOINT: f64 = 50.0;

/// Aggregation output, pre-signal-classification.
#[derive(Debug, Clone, Copy)]
pub struct Aggregate {
    /// Final grade, 0-100, rounded to the nearest integer.
    pub score: u32,

    /// Weighted average over usable factors before caps and penalties.
    pub raw_weighted: f64,

    /// Confidence in the grade, 0-100.
    pub confidence: f64,
}

/// Combine `factors` under `weights`, apply the score adjustments in order,
/// and compute confidence.
pub fn aggregate(
    factors: &FactorSet<FactorScore>,
    weights: &WeightVector,
    adjustments: &[Adjustment],
    rules: &RuleSet,
) -> Aggregate {
    // ── Weighted sum over the usable subset ─────────────────────────────
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (factor, fs) in factors.iter() {
        if fs.usable() {
            let w = *weights.get(factor);
            weighted_sum += fs.value * w;
            weight_total += w;
        }
    }

    let raw_weighted = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        NEUTRAL_MIDPOINT
    };

    // ── Score adjustments, in classifier emission order ─────────────────
    let mut score = raw_weighted;
    for adjustment in adjustments {
        match adjustment {
            Adjustment::ScoreCap { max, .. } => score = score.min(*max),
            Adjustment::ScorePenalty { fraction, .. } => score *= 1.0 - fraction,
            _ => {}
        }
    }

    let score = score.clamp(0.0, 100.0).round() as u32;

    let confidence = compute_confidence(factors, adjustments, rules, weight_total > 0.0);

    Aggregate {
        score,
        raw_weighted,
        confidence,
    }
}

/// Confidence model: full-data baseline scaled by the available fraction of
/// eligible (non-excluded) factors, reduced per anomalous clamp, then capped
/// by any mode that demands it, floored at the configured floor.
fn compute_confidence(
    factors: &FactorSet<FactorScore>,
    adjustments: &[Adjustment],
    rules: &RuleSet,
    any_usable: bool,
) -> f64 {
    let c = &rules.confidence;

    let eligible = factors.iter().filter(|(_, fs)| !fs.excluded).count();
    let available = factors.iter().filter(|(_, fs)| fs.usable()).count();
    let anomalous = factors
        .iter()
        .filter(|(_, fs)| fs.usable() && fs.anomalous)
        .count();

    let mut confidence = if !any_usable || eligible == 0 {
        c.floor
    } else {
        let availability = available as f64 / eligible as f64;
        c.baseline * availability - c.anomaly_deduction * anomalous as f64
    };

    for adjustment in adjustments {
        if let Adjustment::ConfidenceCap { max, .. } = adjustment {
            confidence = confidence.min(*max);
        }
    }

    confidence.clamp(c.floor, 100.0)
}
