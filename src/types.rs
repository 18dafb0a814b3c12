// =============================================================================
// Core Data Model — Polaris Crypto Scanner
// =============================================================================
//
// Shared value types used across the scoring pipeline. Everything here is a
// plain immutable value: snapshots are assembled per request by upstream
// collaborators, flow through the engine, and are never retained.
// =============================================================================

use serde::{Deserialize, Serialize};

// =============================================================================
// Factor
// =============================================================================

/// The four scoring dimensions every token is graded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Fundamentals,
    Technicals,
    Sentiment,
    SmartMoney,
}

impl Factor {
    /// All factors, in the canonical reporting order.
    pub const ALL: [Factor; 4] = [
        Factor::Fundamentals,
        Factor::Technicals,
        Factor::Sentiment,
        Factor::SmartMoney,
    ];

    /// Human-readable name for reasoning strings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fundamentals => "Fundamentals",
            Self::Technicals => "Technicals",
            Self::Sentiment => "Sentiment",
            Self::SmartMoney => "Smart Money",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// FactorScore
// =============================================================================

/// A validated per-factor score.
///
/// `value` is only meaningful when `available` is true. Unavailable factors
/// contribute neither value nor weight to aggregation; they are never
/// defaulted to a number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorScore {
    /// Validated score in [0, 100]. Meaningless when `available` is false.
    pub value: f64,

    /// Whether the upstream collaborator supplied this factor at all.
    pub available: bool,

    /// True when the raw input was outside [0, 100] and had to be clamped.
    pub anomalous: bool,

    /// True when an edge-case mode removed this factor from scoring
    /// (e.g. technicals under stablecoin mode).
    #[serde(default)]
    pub excluded: bool,
}

impl FactorScore {
    pub fn available(value: f64, anomalous: bool) -> Self {
        Self {
            value,
            available: true,
            anomalous,
            excluded: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: 0.0,
            available: false,
            anomalous: false,
            excluded: false,
        }
    }

    /// Whether this factor participates in the weighted sum.
    pub fn usable(&self) -> bool {
        self.available && !self.excluded
    }
}

// =============================================================================
// FactorSet — one slot per factor
// =============================================================================

/// A value per factor, addressable by [`Factor`].
///
/// Used both for normalized scores (`FactorSet<FactorScore>`) and for raw
/// inputs (`FactorSet<Option<f64>>`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FactorSet<T> {
    pub fundamentals: T,
    pub technicals: T,
    pub sentiment: T,
    pub smart_money: T,
}

impl<T> FactorSet<T> {
    pub fn get(&self, factor: Factor) -> &T {
        match factor {
            Factor::Fundamentals => &self.fundamentals,
            Factor::Technicals => &self.technicals,
            Factor::Sentiment => &self.sentiment,
            Factor::SmartMoney => &self.smart_money,
        }
    }

    pub fn get_mut(&mut self, factor: Factor) -> &mut T {
        match factor {
            Factor::Fundamentals => &mut self.fundamentals,
            Factor::Technicals => &mut self.technicals,
            Factor::Sentiment => &mut self.sentiment,
            Factor::SmartMoney => &mut self.smart_money,
        }
    }

    /// Iterate `(factor, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, &T)> {
        Factor::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

/// The active weight vector, keyed by factor.
pub type WeightVector = FactorSet<f64>;

impl WeightVector {
    /// Sum of all four weights.
    pub fn sum(&self) -> f64 {
        self.fundamentals + self.technicals + self.sentiment + self.smart_money
    }

    /// Scale every component so the vector sums to 1.0. A zero vector is
    /// returned unchanged (the degenerate no-eligible-factor case).
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            return *self;
        }
        Self {
            fundamentals: self.fundamentals / total,
            technicals: self.technicals / total,
            sentiment: self.sentiment / total,
            smart_money: self.smart_money / total,
        }
    }
}

// =============================================================================
// TokenSnapshot
// =============================================================================

/// Everything the engine needs to score one token, assembled per request by
/// upstream data collaborators. Raw factor inputs must already be scaled to
/// [0, 100] or left `None` (unavailable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Ticker symbol, e.g. "BTC".
    pub symbol: String,

    /// Whether the token is a recognised stablecoin.
    #[serde(default)]
    pub is_stablecoin: bool,

    /// Age of the token since listing, in days. `None` when unknown.
    #[serde(default)]
    pub age_days: Option<f64>,

    /// The most recent ~1h price move, signed percent.
    #[serde(default)]
    pub price_move_1h_pct: Option<f64>,

    /// 24h trading volume in USD.
    #[serde(default)]
    pub volume_24h_usd: Option<f64>,

    /// Raw factor inputs, each in [0, 100] or unavailable.
    pub factors: FactorSet<Option<f64>>,

    /// Technicals recomputed against a volume-weighted reference price.
    /// Used as the substitution value under flash-crash conditions, where
    /// spot-derived technicals would read the spike as a trend.
    #[serde(default)]
    pub vwap_technicals: Option<f64>,
}

// =============================================================================
// MarketContext
// =============================================================================

/// Ambient market regime signal, supplied per request. All fields optional;
/// an absent indicator means the neutral regime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketContext {
    /// Dominant-asset (BTC) market share, percent of total market cap.
    #[serde(default)]
    pub btc_dominance_pct: Option<f64>,

    /// Total crypto market cap in USD, for display only.
    #[serde(default)]
    pub total_market_cap_usd: Option<f64>,
}

// =============================================================================
// Regime
// =============================================================================

/// Market regime derived from the dominance indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Risk-on: capital rotating out of the dominant asset.
    Bull,
    /// Risk-off: capital sheltering in the dominant asset.
    Bear,
    Neutral,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bull => write!(f, "BULL"),
            Self::Bear => write!(f, "BEAR"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

// =============================================================================
// Signal
// =============================================================================

/// Discrete trading signal bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    /// Rank for monotonicity comparisons: higher is more bullish.
    pub fn bullishness(self) -> u8 {
        match self {
            Self::StrongBuy => 4,
            Self::Buy => 3,
            Self::Hold => 2,
            Self::Sell => 1,
            Self::StrongSell => 0,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Hold => write!(f, "HOLD"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG SELL"),
        }
    }
}
