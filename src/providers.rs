// =============================================================================
// Demo Data Provider — Deterministic snapshot assembly
// =============================================================================
//
// Stands in for the live data-provider clients at the engine's upstream
// boundary. Metrics are derived from a hash of the symbol, so the same
// symbol always produces the same snapshot run to run — useful for the demo
// API and for exercising the full pipeline without network access.
//
// A handful of canned symbols exercise every edge-case mode:
//
//   USDT/USDC/DAI/BUSD/TUSD  — stablecoin mode
//   FRESH                    — new-token mode (12 days old)
//   PUMP                     — flash-crash mode (-24% in 1h, VWAP known)
//   MICRO                    — low-liquidity mode ($40K daily volume)
//   GHOST                    — every factor unavailable
// =============================================================================

use crate::factors::TokenMetrics;
use crate::types::{MarketContext, TokenSnapshot};

const STABLECOINS: &[&str] = &["USDT", "USDC", "DAI", "BUSD", "TUSD"];

/// Deterministic stand-in for the upstream data-client collaborators.
#[derive(Debug, Clone)]
pub struct DemoDataProvider {
    /// BTC dominance reported in the demo market context, percent.
    pub btc_dominance_pct: f64,
}

impl Default for DemoDataProvider {
    fn default() -> Self {
        Self {
            btc_dominance_pct: 52.3,
        }
    }
}

impl DemoDataProvider {
    /// Assemble the engine-facing snapshot for `symbol`.
    pub fn snapshot(&self, symbol: &str) -> TokenSnapshot {
        self.token_metrics(symbol).to_snapshot()
    }

    /// The ambient market context shared by all demo requests.
    pub fn market_context(&self) -> MarketContext {
        MarketContext {
            btc_dominance_pct: Some(self.btc_dominance_pct),
            total_market_cap_usd: Some(2.4e12),
        }
    }

    /// Raw metrics for `symbol`, seeded by a hash of the symbol.
    pub fn token_metrics(&self, symbol: &str) -> TokenMetrics {
        let symbol = symbol.trim().to_uppercase();
        let seed = fnv1a(symbol.as_bytes());

        if symbol == "GHOST" {
            return TokenMetrics {
                symbol,
                ..Default::default()
            };
        }

        let is_stablecoin = STABLECOINS.contains(&symbol.as_str());

        let mut metrics = TokenMetrics {
            symbol: symbol.clone(),
            price_usd: Some(mix(seed, 1, 0.01, 60_000.0)),
            market_cap_usd: Some(mix(seed, 2, 5e6, 50e9)),
            volume_24h_usd: Some(mix(seed, 3, 500_000.0, 2e9)),
            tvl_usd: Some(mix(seed, 4, 1e6, 1e9)),
            github_commits_90d: Some(mix(seed, 5, 0.0, 400.0) as u64),
            github_stars: Some(mix(seed, 6, 100.0, 40_000.0) as u64),
            rsi_14: Some(mix(seed, 7, 20.0, 80.0)),
            macd: Some(mix(seed, 8, -2.0, 2.0)),
            atr_14: Some(mix(seed, 9, 0.5, 9.0)),
            sentiment_score: Some(mix(seed, 10, -0.9, 0.9)),
            social_volume_24h: Some(mix(seed, 11, 200.0, 300_000.0) as u64),
            mentions_positive: Some(mix(seed, 12, 10.0, 2_000.0) as u64),
            mentions_negative: Some(mix(seed, 13, 10.0, 1_000.0) as u64),
            whale_transactions_24h: Some(mix(seed, 14, 0.0, 90.0) as u64),
            exchange_netflow_usd: Some(mix(seed, 15, -40e6, 40e6)),
            holder_concentration: Some(mix(seed, 16, 0.1, 0.9)),
            is_stablecoin,
            age_days: Some(mix(seed, 17, 60.0, 3_000.0)),
            price_move_1h_pct: Some(mix(seed, 18, -4.0, 4.0)),
            vwap_usd: None,
            sma_50: None,
            sma_200: None,
        };

        // Moving averages bracket the price so both cross directions occur.
        if let Some(price) = metrics.price_usd {
            metrics.sma_50 = Some(price * mix(seed, 19, 0.9, 1.1));
            metrics.sma_200 = Some(price * mix(seed, 20, 0.85, 1.15));
        }

        if is_stablecoin {
            metrics.price_usd = Some(1.0);
            metrics.price_move_1h_pct = Some(mix(seed, 21, -0.2, 0.2));
            metrics.rsi_14 = Some(50.0);
            metrics.macd = Some(0.0);
            metrics.age_days = Some(2_500.0);
        }

        // Canned edge-case profiles.
        match symbol.as_str() {
            "FRESH" => {
                metrics.age_days = Some(12.0);
                metrics.github_commits_90d = None;
                metrics.github_stars = None;
            }
            "PUMP" => {
                metrics.price_move_1h_pct = Some(-24.0);
                let price = metrics.price_usd.unwrap_or(1.0);
                // VWAP barely moved by the spike.
                metrics.vwap_usd = Some(price * 1.25);
            }
            "MICRO" => {
                metrics.volume_24h_usd = Some(40_000.0);
                metrics.market_cap_usd = Some(3e6);
            }
            _ => {}
        }

        metrics
    }
}

// =============================================================================
// Deterministic hashing helpers
// =============================================================================

/// FNV-1a 64-bit.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Map `(seed, stream)` onto `[lo, hi)` uniformly.
fn mix(seed: u64, stream: u64, lo: f64, hi: f64) -> f64 {
    let mut x = seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    // splitmix64 finalizer
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    let unit = (x >> 11) as f64 / (1u64 << 53) as f64;
    lo + unit * (hi - lo)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_symbol_same_snapshot() {
        let provider = DemoDataProvider::default();
        let a = provider.token_metrics("BTC");
        let b = provider.token_metrics("btc ");
        assert_eq!(a.market_cap_usd, b.market_cap_usd);
        assert_eq!(a.rsi_14, b.rsi_14);
    }

    #[test]
    fn different_symbols_differ() {
        let provider = DemoDataProvider::default();
        let a = provider.token_metrics("BTC");
        let b = provider.token_metrics("ETH");
        assert_ne!(a.market_cap_usd, b.market_cap_usd);
    }

    #[test]
    fn stablecoins_are_flagged() {
        let provider = DemoDataProvider::default();
        for sym in STABLECOINS {
            assert!(provider.token_metrics(sym).is_stablecoin, "{sym}");
        }
        assert!(!provider.token_metrics("BTC").is_stablecoin);
    }

    #[test]
    fn canned_profiles_trigger_their_modes() {
        let provider = DemoDataProvider::default();

        let fresh = provider.snapshot("FRESH");
        assert!(fresh.age_days.unwrap() < 30.0);

        let pump = provider.snapshot("PUMP");
        assert!(pump.price_move_1h_pct.unwrap().abs() > 15.0);
        assert!(pump.vwap_technicals.is_some());

        let micro = provider.snapshot("MICRO");
        assert!(micro.volume_24h_usd.unwrap() < 100_000.0);

        let ghost = provider.snapshot("GHOST");
        assert!(ghost.factors.fundamentals.is_none());
    }

    #[test]
    fn mix_stays_in_range() {
        for stream in 0..64 {
            let v = mix(0xdead_beef, stream, 10.0, 20.0);
            assert!((10.0..20.0).contains(&v));
        }
    }
}
