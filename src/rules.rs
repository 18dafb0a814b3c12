// =============================================================================
// Rule Repository — Hot-reloadable scoring rules with atomic save
// =============================================================================
//
// The single source of every threshold, weight, and penalty in the scoring
// pipeline. No other module may hardcode a scoring parameter.
//
// The rule document is plain JSON. All fields carry `#[serde(default)]` so
// that an older or partial file still loads. Validation runs after parsing
// and fails fast on any structural violation — a document that loads is a
// document the engine can trust.
//
// Reload never mutates in place: a fresh `RuleSet` is built from disk and the
// single `Arc<RuleSet>` reference in AppState is swapped. In-flight scoring
// calls keep the snapshot they started with.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScoreError;
use crate::types::{Factor, Regime, WeightVector};

/// Tolerance for weight-vector sum checks.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_strong_buy() -> f64 {
    80.0
}

fn default_buy() -> f64 {
    65.0
}

fn default_hold() -> f64 {
    50.0
}

fn default_sell() -> f64 {
    35.0
}

fn default_equal_weights() -> WeightVector {
    WeightVector {
        fundamentals: 0.25,
        technicals: 0.25,
        sentiment: 0.25,
        smart_money: 0.25,
    }
}

fn default_bull_weights() -> WeightVector {
    WeightVector {
        fundamentals: 0.15,
        technicals: 0.35,
        sentiment: 0.15,
        smart_money: 0.35,
    }
}

fn default_bear_weights() -> WeightVector {
    WeightVector {
        fundamentals: 0.40,
        technicals: 0.15,
        sentiment: 0.20,
        smart_money: 0.25,
    }
}

fn default_bull_dominance_below() -> f64 {
    45.0
}

fn default_bear_dominance_above() -> f64 {
    55.0
}

fn default_stablecoin_max_score() -> f64 {
    60.0
}

fn default_new_token_age_days() -> f64 {
    30.0
}

fn default_new_token_confidence_cap() -> f64 {
    35.0
}

fn default_new_token_lookback_factors() -> Vec<Factor> {
    // Technicals is the only factor built on multi-month lookbacks
    // (SMA-50/200); the other buckets use 24h-90d windows that a young
    // token can still populate.
    vec![Factor::Technicals]
}

fn default_flash_crash_move_pct() -> f64 {
    15.0
}

fn default_low_liquidity_volume_floor_usd() -> f64 {
    100_000.0
}

fn default_low_liquidity_penalty() -> f64 {
    0.20
}

fn default_confidence_baseline() -> f64 {
    90.0
}

fn default_confidence_anomaly_deduction() -> f64 {
    5.0
}

fn default_confidence_floor() -> f64 {
    10.0
}

// =============================================================================
// SignalThresholds
// =============================================================================

/// Lower bounds of the four upper signal buckets. A score below `sell` is
/// STRONG SELL. Boundary values belong to the higher bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalThresholds {
    #[serde(default = "default_strong_buy")]
    pub strong_buy: f64,

    #[serde(default = "default_buy")]
    pub buy: f64,

    #[serde(default = "default_hold")]
    pub hold: f64,

    #[serde(default = "default_sell")]
    pub sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy: default_strong_buy(),
            buy: default_buy(),
            hold: default_hold(),
            sell: default_sell(),
        }
    }
}

// =============================================================================
// RegimeRules
// =============================================================================

/// Regime derivation thresholds and the per-regime weight overrides.
///
/// Regime-dependent weighting is data, not code: the Weight Rebalancer only
/// looks the override up by regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeRules {
    /// BTC dominance below this percentage reads as risk-on (Bull).
    #[serde(default = "default_bull_dominance_below")]
    pub bull_dominance_below: f64,

    /// BTC dominance above this percentage reads as risk-off (Bear).
    #[serde(default = "default_bear_dominance_above")]
    pub bear_dominance_above: f64,

    /// Bull override: favour technicals and smart-money.
    #[serde(default = "default_bull_weights")]
    pub bull_weights: WeightVector,

    /// Bear override: favour fundamentals.
    #[serde(default = "default_bear_weights")]
    pub bear_weights: WeightVector,
}

impl Default for RegimeRules {
    fn default() -> Self {
        Self {
            bull_dominance_below: default_bull_dominance_below(),
            bear_dominance_above: default_bear_dominance_above(),
            bull_weights: default_bull_weights(),
            bear_weights: default_bear_weights(),
        }
    }
}

// =============================================================================
// EdgeCaseRules
// =============================================================================

/// Parameters for the four edge-case scoring modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeCaseRules {
    /// Hard cap on the final score of a stablecoin.
    #[serde(default = "default_stablecoin_max_score")]
    pub stablecoin_max_score: f64,

    /// Tokens younger than this (days) enter new-token mode.
    #[serde(default = "default_new_token_age_days")]
    pub new_token_age_days: f64,

    /// Confidence ceiling applied under new-token mode, percent.
    #[serde(default = "default_new_token_confidence_cap")]
    pub new_token_confidence_cap: f64,

    /// Factors excluded under new-token mode (insufficient history).
    #[serde(default = "default_new_token_lookback_factors")]
    pub new_token_lookback_factors: Vec<Factor>,

    /// Absolute 1h price move (percent) above which flash-crash mode fires.
    #[serde(default = "default_flash_crash_move_pct")]
    pub flash_crash_move_pct: f64,

    /// 24h volume (USD) below which low-liquidity mode fires.
    #[serde(default = "default_low_liquidity_volume_floor_usd")]
    pub low_liquidity_volume_floor_usd: f64,

    /// Multiplicative penalty fraction applied under low-liquidity mode
    /// (0.20 means the final score is scaled by 0.80).
    #[serde(default = "default_low_liquidity_penalty")]
    pub low_liquidity_penalty: f64,
}

impl Default for EdgeCaseRules {
    fn default() -> Self {
        Self {
            stablecoin_max_score: default_stablecoin_max_score(),
            new_token_age_days: default_new_token_age_days(),
            new_token_confidence_cap: default_new_token_confidence_cap(),
            new_token_lookback_factors: default_new_token_lookback_factors(),
            flash_crash_move_pct: default_flash_crash_move_pct(),
            low_liquidity_volume_floor_usd: default_low_liquidity_volume_floor_usd(),
            low_liquidity_penalty: default_low_liquidity_penalty(),
        }
    }
}

// =============================================================================
// ConfidenceRules
// =============================================================================

/// Parameters of the confidence model. Confidence is a function of data
/// availability and quality, never of the score's numeric magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceRules {
    /// Confidence when every eligible factor is available and clean.
    #[serde(default = "default_confidence_baseline")]
    pub baseline: f64,

    /// Deduction per anomalously-clamped factor input.
    #[serde(default = "default_confidence_anomaly_deduction")]
    pub anomaly_deduction: f64,

    /// Confidence never reported below this.
    #[serde(default = "default_confidence_floor")]
    pub floor: f64,
}

impl Default for ConfidenceRules {
    fn default() -> Self {
        Self {
            baseline: default_confidence_baseline(),
            anomaly_deduction: default_confidence_anomaly_deduction(),
            floor: default_confidence_floor(),
        }
    }
}

// =============================================================================
// RuleSet
// =============================================================================

/// The complete, validated rule document. Immutable once constructed; shared
/// across concurrent scoring calls behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub signal_thresholds: SignalThresholds,

    /// Base factor weights, used under the neutral regime. Must sum to 1.0.
    #[serde(default = "default_equal_weights")]
    pub base_weights: WeightVector,

    #[serde(default)]
    pub regime: RegimeRules,

    #[serde(default)]
    pub edge_cases: EdgeCaseRules,

    #[serde(default)]
    pub confidence: ConfidenceRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            signal_thresholds: SignalThresholds::default(),
            base_weights: default_equal_weights(),
            regime: RegimeRules::default(),
            edge_cases: EdgeCaseRules::default(),
            confidence: ConfidenceRules::default(),
        }
    }
}

impl RuleSet {
    /// Load and validate a rule document from `path`.
    ///
    /// A missing file is reported distinctly (the caller may fall back to
    /// defaults); a present-but-invalid file is always a hard error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::configuration(format!(
                "failed to read rule document {}: {e}",
                path.display()
            ))
        })?;

        let rules: Self = serde_json::from_str(&content).map_err(|e| {
            ScoreError::configuration(format!(
                "failed to parse rule document {}: {e}",
                path.display()
            ))
        })?;

        rules.validate()?;

        info!(path = %path.display(), "scoring rules loaded");
        Ok(rules)
    }

    /// Persist the rule document to `path` using an atomic write (write to
    /// `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise rule document to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp rules to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp rules to {}", path.display()))?;

        info!(path = %path.display(), "scoring rules saved (atomic)");
        Ok(())
    }

    /// Check every structural invariant of the document. Called on every
    /// load; also usable on documents received over the API before a swap.
    pub fn validate(&self) -> Result<(), ScoreError> {
        check_weight_vector("base_weights", &self.base_weights)?;
        check_weight_vector("regime.bull_weights", &self.regime.bull_weights)?;
        check_weight_vector("regime.bear_weights", &self.regime.bear_weights)?;

        let t = &self.signal_thresholds;
        let ordered = t.strong_buy > t.buy && t.buy > t.hold && t.hold > t.sell;
        if !ordered {
            return Err(ScoreError::configuration(format!(
                "signal thresholds must be strictly decreasing: strong_buy={} buy={} hold={} sell={}",
                t.strong_buy, t.buy, t.hold, t.sell
            )));
        }
        for (name, v) in [
            ("strong_buy", t.strong_buy),
            ("buy", t.buy),
            ("hold", t.hold),
            ("sell", t.sell),
        ] {
            if !(0.0..=100.0).contains(&v) {
                return Err(ScoreError::configuration(format!(
                    "signal threshold {name}={v} outside [0, 100]"
                )));
            }
        }

        let e = &self.edge_cases;
        if !(0.0..=100.0).contains(&e.stablecoin_max_score) {
            return Err(ScoreError::configuration(format!(
                "stablecoin_max_score={} outside [0, 100]",
                e.stablecoin_max_score
            )));
        }
        if e.new_token_age_days < 0.0 {
            return Err(ScoreError::configuration(format!(
                "new_token_age_days={} must be non-negative",
                e.new_token_age_days
            )));
        }
        if !(0.0..=100.0).contains(&e.new_token_confidence_cap) {
            return Err(ScoreError::configuration(format!(
                "new_token_confidence_cap={} outside [0, 100]",
                e.new_token_confidence_cap
            )));
        }
        if e.flash_crash_move_pct <= 0.0 {
            return Err(ScoreError::configuration(format!(
                "flash_crash_move_pct={} must be positive",
                e.flash_crash_move_pct
            )));
        }
        if e.low_liquidity_volume_floor_usd < 0.0 {
            return Err(ScoreError::configuration(format!(
                "low_liquidity_volume_floor_usd={} must be non-negative",
                e.low_liquidity_volume_floor_usd
            )));
        }
        if !(0.0..=1.0).contains(&e.low_liquidity_penalty) {
            return Err(ScoreError::configuration(format!(
                "low_liquidity_penalty={} outside [0, 1]",
                e.low_liquidity_penalty
            )));
        }

        let c = &self.confidence;
        for (name, v) in [
            ("confidence.baseline", c.baseline),
            ("confidence.anomaly_deduction", c.anomaly_deduction),
            ("confidence.floor", c.floor),
        ] {
            if !(0.0..=100.0).contains(&v) {
                return Err(ScoreError::configuration(format!(
                    "{name}={v} outside [0, 100]"
                )));
            }
        }

        if c.floor > self.edge_cases.new_token_confidence_cap {
            return Err(ScoreError::configuration(format!(
                "confidence.floor={} exceeds new_token_confidence_cap={} — the floor would override the cap",
                c.floor, self.edge_cases.new_token_confidence_cap
            )));
        }

        let r = &self.regime;
        if r.bull_dominance_below > r.bear_dominance_above {
            return Err(ScoreError::configuration(format!(
                "regime thresholds overlap: bull_dominance_below={} > bear_dominance_above={}",
                r.bull_dominance_below, r.bear_dominance_above
            )));
        }

        Ok(())
    }

    /// The weight override for `regime` (base weights under Neutral).
    pub fn weights_for_regime(&self, regime: Regime) -> &WeightVector {
        match regime {
            Regime::Bull => &self.regime.bull_weights,
            Regime::Bear => &self.regime.bear_weights,
            Regime::Neutral => &self.base_weights,
        }
    }
}

fn check_weight_vector(name: &str, weights: &WeightVector) -> Result<(), ScoreError> {
    for (factor, &w) in weights.iter() {
        if !w.is_finite() || w < 0.0 {
            return Err(ScoreError::configuration(format!(
                "{name}.{factor:?} weight {w} must be finite and non-negative",
            )));
        }
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ScoreError::configuration(format!(
            "{name} weights sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        let rules = RuleSet::default();
        rules.validate().unwrap();
        assert!((rules.base_weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((rules.regime.bull_weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((rules.regime.bear_weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert_eq!(rules.signal_thresholds.strong_buy, 80.0);
        assert_eq!(rules.edge_cases.stablecoin_max_score, 60.0);
        assert_eq!(rules.edge_cases.low_liquidity_penalty, 0.20);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let rules: RuleSet = serde_json::from_str("{}").unwrap();
        rules.validate().unwrap();
        assert_eq!(rules.signal_thresholds.buy, 65.0);
        assert_eq!(rules.edge_cases.new_token_age_days, 30.0);
        assert_eq!(
            rules.edge_cases.new_token_lookback_factors,
            vec![Factor::Technicals]
        );
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "edge_cases": { "stablecoin_max_score": 55.0 } }"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        rules.validate().unwrap();
        assert_eq!(rules.edge_cases.stablecoin_max_score, 55.0);
        assert_eq!(rules.edge_cases.low_liquidity_volume_floor_usd, 100_000.0);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut rules = RuleSet::default();
        rules.base_weights.technicals = 0.5;
        assert!(matches!(
            rules.validate(),
            Err(ScoreError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_negative_weight() {
        let mut rules = RuleSet::default();
        rules.base_weights.fundamentals = -0.25;
        rules.base_weights.technicals = 0.75;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut rules = RuleSet::default();
        rules.signal_thresholds.buy = 85.0; // above strong_buy
        assert!(rules.validate().is_err());
    }

    #[test]
    fn rejects_penalty_above_one() {
        let mut rules = RuleSet::default();
        rules.edge_cases.low_liquidity_penalty = 1.5;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn rejects_confidence_floor_above_new_token_cap() {
        let mut rules = RuleSet::default();
        rules.confidence.floor = 50.0; // above the 35% new-token ceiling
        assert!(rules.validate().is_err());

        rules.confidence.floor = 35.0; // equal to the ceiling is fine
        rules.validate().unwrap();
    }

    #[test]
    fn rejects_overlapping_regime_thresholds() {
        let mut rules = RuleSet::default();
        rules.regime.bull_dominance_below = 60.0;
        rules.regime.bear_dominance_above = 50.0;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn weights_for_regime_lookup() {
        let rules = RuleSet::default();
        assert!(
            rules.weights_for_regime(Regime::Bull).technicals
                > rules.weights_for_regime(Regime::Neutral).technicals
        );
        assert!(
            rules.weights_for_regime(Regime::Bear).fundamentals
                > rules.weights_for_regime(Regime::Neutral).fundamentals
        );
    }

    #[test]
    fn roundtrip_serialisation() {
        let rules = RuleSet::default();
        let json = serde_json::to_string(&rules).unwrap();
        let rules2: RuleSet = serde_json::from_str(&json).unwrap();
        rules2.validate().unwrap();
        assert_eq!(
            rules.edge_cases.flash_crash_move_pct,
            rules2.edge_cases.flash_crash_move_pct
        );
    }
}
