// =============================================================================
// Factor Scorers — Raw token metrics → four [0, 100] factor inputs
// =============================================================================
//
// Upstream of the engine proper. Each scorer starts from a neutral 50
// baseline and adds or subtracts per threshold bucket, clamped to [0, 100].
// A metric that is absent contributes nothing; a scorer with NO relevant
// metrics at all returns `None` so the engine can treat the whole factor as
// unavailable instead of reporting a fake neutral.
// =============================================================================

pub mod fundamentals;
pub mod sentiment;
pub mod smart_money;
pub mod technicals;

use serde::{Deserialize, Serialize};

use crate::types::{FactorSet, TokenSnapshot};

/// Raw per-token metrics gathered by upstream data collaborators. Every
/// field is optional: providers fail independently and the scorers degrade
/// instead of blocking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub symbol: String,

    // ── Market ──────────────────────────────────────────────────────────
    pub price_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub tvl_usd: Option<f64>,

    // ── Development ─────────────────────────────────────────────────────
    pub github_commits_90d: Option<u64>,
    pub github_stars: Option<u64>,

    // ── Technicals ──────────────────────────────────────────────────────
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub atr_14: Option<f64>,

    // ── Sentiment ───────────────────────────────────────────────────────
    /// Aggregate sentiment in [-1, 1].
    pub sentiment_score: Option<f64>,
    pub social_volume_24h: Option<u64>,
    pub mentions_positive: Option<u64>,
    pub mentions_negative: Option<u64>,

    // ── On-chain / smart money ──────────────────────────────────────────
    pub whale_transactions_24h: Option<u64>,
    /// Net USD flow onto exchanges; negative means outflow (accumulation).
    pub exchange_netflow_usd: Option<f64>,
    /// Fraction of supply held by the top wallets, in [0, 1].
    pub holder_concentration: Option<f64>,

    // ── Listing / classification ────────────────────────────────────────
    pub is_stablecoin: bool,
    pub age_days: Option<f64>,
    pub price_move_1h_pct: Option<f64>,
    /// Volume-weighted average price over the recent window.
    pub vwap_usd: Option<f64>,
}

impl TokenMetrics {
    /// Assemble the engine-facing snapshot: run all four scorers against
    /// spot price, plus the VWAP-based technicals variant when a VWAP is
    /// known (the flash-crash substitution input).
    pub fn to_snapshot(&self) -> TokenSnapshot {
        let vwap_technicals = self
            .vwap_usd
            .and_then(|vwap| technicals::score(self, Some(vwap)));

        TokenSnapshot {
            symbol: self.symbol.clone(),
            is_stablecoin: self.is_stablecoin,
            age_days: self.age_days,
            price_move_1h_pct: self.price_move_1h_pct,
            volume_24h_usd: self.volume_24h_usd,
            factors: FactorSet {
                fundamentals: fundamentals::score(self),
                technicals: technicals::score(self, self.price_usd),
                sentiment: sentiment::score(self),
                smart_money: smart_money::score(self),
            },
            vwap_technicals,
        }
    }
}

/// Shared clamp for all bucket scorers.
pub(crate) fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
