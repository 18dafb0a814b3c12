// =============================================================================
// Edge-Case Classifier — Stablecoin / New-Token / Flash-Crash / Low-Liquidity
// =============================================================================
//
// Inspects the token snapshot and emits an ordered list of active modes plus
// the tagged adjustments they imply. Downstream stages apply the adjustments
// mechanically; nothing outside this module decides WHY a score was adjusted.
//
// Fixed precedence (evaluated top-to-bottom):
//
//   1. STABLECOIN     — mutually exclusive with NewToken; first match wins.
//   2. NEW TOKEN      — skipped if Stablecoin matched.
//   3. FLASH CRASH    — composes freely with anything above.
//   4. LOW LIQUIDITY  — composes freely with anything above.
//
// Adjustments are applied in emission order, so a score cap always lands
// before a multiplicative penalty when both are active.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::RuleSet;
use crate::types::{Factor, TokenSnapshot};

// =============================================================================
// Types
// =============================================================================

/// An edge-case scoring mode detected for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeMode {
    Stablecoin,
    NewToken,
    FlashCrash,
    LowLiquidity,
}

impl std::fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stablecoin => write!(f, "STABLECOIN"),
            Self::NewToken => write!(f, "NEW_TOKEN"),
            Self::FlashCrash => write!(f, "FLASH_CRASH"),
            Self::LowLiquidity => write!(f, "LOW_LIQUIDITY"),
        }
    }
}

/// A single tagged transformation implied by an active mode. Each carries the
/// mode that emitted it so results can report the full provenance chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Remove a factor from weighting entirely (its weight is redistributed).
    ExcludeFactor { factor: Factor, mode: EdgeMode },

    /// Replace a factor's input with an alternative value (e.g. VWAP-derived
    /// technicals during a flash crash).
    SubstituteFactor {
        factor: Factor,
        value: f64,
        mode: EdgeMode,
    },

    /// Hard cap on the final score.
    ScoreCap { max: f64, mode: EdgeMode },

    /// Hard cap on the reported confidence.
    ConfidenceCap { max: f64, mode: EdgeMode },

    /// Multiplicative penalty on the final score: `score * (1 - fraction)`.
    ScorePenalty { fraction: f64, mode: EdgeMode },
}

/// Classifier output: the modes that fired, in precedence order, and the
/// adjustments they imply, in application order.
#[derive(Debug, Clone, Default)]
pub struct EdgeOutcome {
    pub modes: Vec<EdgeMode>,
    pub adjustments: Vec<Adjustment>,
}

impl EdgeOutcome {
    pub fn is_active(&self, mode: EdgeMode) -> bool {
        self.modes.contains(&mode)
    }

    /// Factors excluded from weighting by any active mode.
    pub fn excluded_factors(&self) -> Vec<Factor> {
        self.adjustments
            .iter()
            .filter_map(|adj| match adj {
                Adjustment::ExcludeFactor { factor, .. } => Some(*factor),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Evaluate every edge-case condition for `snapshot` under `rules`.
pub fn classify(snapshot: &TokenSnapshot, rules: &RuleSet) -> EdgeOutcome {
    let mut outcome = EdgeOutcome::default();
    let edge = &rules.edge_cases;

    // ── 1. Stablecoin ───────────────────────────────────────────────────
    // Price action carries no information for a pegged asset: technicals
    // are removed and the final grade is capped.
    if snapshot.is_stablecoin {
        outcome.modes.push(EdgeMode::Stablecoin);
        outcome.adjustments.push(Adjustment::ExcludeFactor {
            factor: Factor::Technicals,
            mode: EdgeMode::Stablecoin,
        });
        outcome.adjustments.push(Adjustment::ScoreCap {
            max: edge.stablecoin_max_score,
            mode: EdgeMode::Stablecoin,
        });
    }

    // ── 2. New token (mutually exclusive with stablecoin) ───────────────
    if !outcome.is_active(EdgeMode::Stablecoin) {
        if let Some(age) = snapshot.age_days {
            if age < edge.new_token_age_days {
                outcome.modes.push(EdgeMode::NewToken);
                for &factor in &edge.new_token_lookback_factors {
                    outcome.adjustments.push(Adjustment::ExcludeFactor {
                        factor,
                        mode: EdgeMode::NewToken,
                    });
                }
                outcome.adjustments.push(Adjustment::ConfidenceCap {
                    max: edge.new_token_confidence_cap,
                    mode: EdgeMode::NewToken,
                });
            }
        }
    }

    // ── 3. Flash crash ──────────────────────────────────────────────────
    // The spike is never read as a trend. If technicals survived the modes
    // above, substitute the VWAP-derived value; with no VWAP variant the
    // spot-derived technicals are unusable and drop out.
    if let Some(move_pct) = snapshot.price_move_1h_pct {
        if move_pct.abs() > edge.flash_crash_move_pct {
            outcome.modes.push(EdgeMode::FlashCrash);
            let technicals_already_out = outcome
                .excluded_factors()
                .contains(&Factor::Technicals);
            if !technicals_already_out {
                match snapshot.vwap_technicals {
                    Some(value) => outcome.adjustments.push(Adjustment::SubstituteFactor {
                        factor: Factor::Technicals,
                        value,
                        mode: EdgeMode::FlashCrash,
                    }),
                    None => outcome.adjustments.push(Adjustment::ExcludeFactor {
                        factor: Factor::Technicals,
                        mode: EdgeMode::FlashCrash,
                    }),
                }
            }
        }
    }

    // ── 4. Low liquidity ────────────────────────────────────────────────
    if let Some(volume) = snapshot.volume_24h_usd {
        if volume < edge.low_liquidity_volume_floor_usd {
            outcome.modes.push(EdgeMode::LowLiquidity);
            outcome.adjustments.push(Adjustment::ScorePenalty {
                fraction: edge.low_liquidity_penalty,
                mode: EdgeMode::LowLiquidity,
            });
        }
    }

    if !outcome.modes.is_empty() {
        debug!(
            symbol = %snapshot.symbol,
            modes = ?outcome.modes,
            "edge-case modes active"
        );
    }

    outcome
}
