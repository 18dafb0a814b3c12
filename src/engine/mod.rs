// =============================================================================
// Scoring Engine — Pipeline orchestration
// =============================================================================
//
// Grades one token per call. The pipeline is a chain of pure stages:
//
//   validate → normalize → classify edge cases → rebalance weights
//            → aggregate (score + confidence) → classify signal
//
// The engine holds nothing but an immutable `Arc<RuleSet>`; every invocation
// is independent and side-effect-free, so callers may score many tokens
// concurrently without any locking. All degradations (missing factors,
// clamped inputs, edge-case modes) are recorded in the result so consumers
// can explain the score rather than merely report it.
// =============================================================================

pub mod aggregate;
pub mod edge_cases;
pub mod normalize;
pub mod signal;
pub mod weights;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScoreError;
use crate::rules::RuleSet;
use crate::types::{
    Factor, FactorScore, FactorSet, MarketContext, Regime, Signal, TokenSnapshot, WeightVector,
};

use edge_cases::{Adjustment, EdgeMode, EdgeOutcome};

// =============================================================================
// ScoreResult
// =============================================================================

/// The complete grading verdict for one token. Immutable once produced;
/// downstream consumers format it but never recompute score, signal, or
/// confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Unique identifier for this scoring run (UUID v4).
    pub id: String,

    /// Ticker symbol, e.g. "BTC".
    pub symbol: String,

    /// ISO 8601 timestamp of when the score was produced.
    pub timestamp: String,

    /// Overall grade, 0-100.
    pub score: u32,

    /// Discrete trading signal derived from the grade.
    pub signal: Signal,

    /// Confidence in the grade, 0-100 percent.
    pub confidence: f64,

    /// Per-factor breakdown after normalization and edge-case adjustments.
    pub factors: FactorSet<FactorScore>,

    /// The weight vector handed to the aggregator: regime override with
    /// mode-excluded factors zeroed and the remainder renormalized. A factor
    /// that is merely unavailable keeps its weight here; its redistribution
    /// over the available subset happens inside aggregation and is reported
    /// in `notes`, not reflected in this vector.
    pub weights: WeightVector,

    /// Market regime active for this request.
    pub regime: Regime,

    /// Edge-case modes that fired, in precedence order.
    pub modes: Vec<EdgeMode>,

    /// Convenience flag: the low-liquidity penalty was applied.
    pub low_liquidity: bool,

    /// Human-readable notes for every degradation that occurred.
    pub notes: Vec<String>,

    /// One-line explanation of the grade.
    pub reasoning: String,
}

// =============================================================================
// ScoringEngine
// =============================================================================

/// Stateless per-request scorer over an immutable rule snapshot.
pub struct ScoringEngine {
    rules: Arc<RuleSet>,
}

impl ScoringEngine {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Grade `snapshot` under `context`.
    ///
    /// Only structurally invalid input is an error. Missing factor data
    /// degrades confidence; out-of-range factor data is clamped and noted.
    pub fn score(
        &self,
        snapshot: &TokenSnapshot,
        context: &MarketContext,
    ) -> Result<ScoreResult, ScoreError> {
        validate_shape(snapshot, context)?;

        // ── Normalize raw factor inputs ─────────────────────────────────
        let mut factors = normalize::normalize_factors(&snapshot.symbol, &snapshot.factors)?;

        // ── Edge cases ──────────────────────────────────────────────────
        let outcome = edge_cases::classify(snapshot, &self.rules);
        apply_factor_adjustments(&mut factors, &outcome.adjustments);

        // ── Regime and weights ──────────────────────────────────────────
        let regime = weights::derive_regime(context, &self.rules);
        let excluded = outcome.excluded_factors();
        let active = weights::active_weights(&self.rules, regime, &excluded);

        // ── Aggregate and classify ──────────────────────────────────────
        let agg = aggregate::aggregate(&factors, &active, &outcome.adjustments, &self.rules);
        let sig = signal::classify(agg.score, &self.rules.signal_thresholds);

        let notes = degradation_notes(&factors, &outcome);
        let reasoning = build_reasoning(&snapshot.symbol, agg.score, sig, &factors, &outcome);

        let result = ScoreResult {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: snapshot.symbol.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            score: agg.score,
            signal: sig,
            confidence: (agg.confidence * 10.0).round() / 10.0,
            factors,
            weights: active,
            regime,
            modes: outcome.modes.clone(),
            low_liquidity: outcome.is_active(EdgeMode::LowLiquidity),
            notes,
            reasoning,
        };

        info!(
            symbol = %result.symbol,
            score = result.score,
            signal = %result.signal,
            confidence = result.confidence,
            regime = %result.regime,
            modes = ?result.modes,
            "token scored"
        );

        Ok(result)
    }
}

// =============================================================================
// Pipeline helpers
// =============================================================================

/// Reject structurally malformed input before scoring begins.
fn validate_shape(snapshot: &TokenSnapshot, context: &MarketContext) -> Result<(), ScoreError> {
    if snapshot.symbol.trim().is_empty() {
        return Err(ScoreError::invalid_input("token symbol is empty"));
    }

    for (name, value) in [
        ("age_days", snapshot.age_days),
        ("price_move_1h_pct", snapshot.price_move_1h_pct),
        ("volume_24h_usd", snapshot.volume_24h_usd),
        ("vwap_technicals", snapshot.vwap_technicals),
    ] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ScoreError::invalid_input(format!(
                    "{}: {name} is not a finite number",
                    snapshot.symbol
                )));
            }
        }
    }
    if let Some(age) = snapshot.age_days {
        if age < 0.0 {
            return Err(ScoreError::invalid_input(format!(
                "{}: age_days is negative",
                snapshot.symbol
            )));
        }
    }

    for (name, value) in [
        ("btc_dominance_pct", context.btc_dominance_pct),
        ("total_market_cap_usd", context.total_market_cap_usd),
    ] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ScoreError::invalid_input(format!(
                    "market context: {name} is not a finite number"
                )));
            }
        }
    }

    Ok(())
}

/// Fold factor-level adjustments (exclusions, substitutions) into the
/// normalized factor set. Substituted values arrive pre-scaled but are
/// clamped anyway; a substitution also clears the upstream anomaly flag
/// since the anomalous input is no longer in play.
fn apply_factor_adjustments(factors: &mut FactorSet<FactorScore>, adjustments: &[Adjustment]) {
    for adjustment in adjustments {
        match adjustment {
            Adjustment::ExcludeFactor { factor, .. } => {
                factors.get_mut(*factor).excluded = true;
            }
            Adjustment::SubstituteFactor { factor, value, .. } => {
                *factors.get_mut(*factor) = FactorScore::available(value.clamp(0.0, 100.0), false);
            }
            _ => {}
        }
    }
}

/// One note per degradation, in a stable order: modes first, then missing
/// factors, then anomalous clamps.
fn degradation_notes(factors: &FactorSet<FactorScore>, outcome: &EdgeOutcome) -> Vec<String> {
    let mut notes = Vec::new();

    for adjustment in &outcome.adjustments {
        match adjustment {
            Adjustment::ExcludeFactor { factor, mode } => {
                notes.push(format!("{factor} excluded from weighting ({mode})"));
            }
            Adjustment::SubstituteFactor { factor, mode, .. } => {
                notes.push(format!(
                    "{factor} recomputed from volume-weighted reference price ({mode})"
                ));
            }
            Adjustment::ScoreCap { max, mode } => {
                notes.push(format!("score capped at {max} ({mode})"));
            }
            Adjustment::ConfidenceCap { max, mode } => {
                notes.push(format!("confidence capped at {max}% ({mode})"));
            }
            Adjustment::ScorePenalty { fraction, mode } => {
                notes.push(format!(
                    "score reduced by {:.0}% ({mode})",
                    fraction * 100.0
                ));
            }
        }
    }

    for (factor, fs) in factors.iter() {
        if !fs.available && !fs.excluded {
            notes.push(format!(
                "{factor} unavailable — weight redistributed, confidence reduced"
            ));
        }
        if fs.anomalous {
            notes.push(format!("{factor} input was out of range and clamped"));
        }
    }

    notes
}

/// One-line explanation: strongest and weakest usable factors plus active
/// modes. Stablecoin analysis leads with reserve backing over price action.
fn build_reasoning(
    symbol: &str,
    score: u32,
    sig: Signal,
    factors: &FactorSet<FactorScore>,
    outcome: &EdgeOutcome,
) -> String {
    let mut parts = vec![format!("{symbol} scored {score}/100 ({sig})")];

    if outcome.is_active(EdgeMode::Stablecoin) {
        parts.push(
            "stablecoin: grade reflects reserve backing and peg stability, not price action"
                .to_string(),
        );
    }

    let usable: Vec<(Factor, f64)> = factors
        .iter()
        .filter(|(_, fs)| fs.usable())
        .map(|(f, fs)| (f, fs.value))
        .collect();

    if let (Some(best), Some(worst)) = (
        usable
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1)),
        usable
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1)),
    ) {
        parts.push(format!("strongest: {} ({:.0}/100)", best.0, best.1));
        parts.push(format!("weakest: {} ({:.0}/100)", worst.0, worst.1));
    }

    if !outcome.modes.is_empty() {
        let modes: Vec<String> = outcome.modes.iter().map(|m| m.to_string()).collect();
        parts.push(format!("modes: {}", modes.join(", ")));
    }

    parts.join(" | ")
}
