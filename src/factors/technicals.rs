// =============================================================================
// Technicals Scorer — RSI, MACD, moving averages, volume ratio, volatility
// =============================================================================
//
// Takes an explicit reference price so the snapshot assembler can produce
// two variants: one against spot, and one against VWAP for the flash-crash
// substitution (a spike distorts spot but barely moves VWAP).
// =============================================================================

use super::{clamp_score, TokenMetrics};

/// Score technicals on [0, 100] against `reference_price`. Returns `None`
/// when no technical metric is available at all.
pub fn score(m: &TokenMetrics, reference_price: Option<f64>) -> Option<f64> {
    let any = m.rsi_14.is_some()
        || m.macd.is_some()
        || (m.sma_50.is_some() && m.sma_200.is_some())
        || (m.volume_24h_usd.is_some() && m.market_cap_usd.is_some())
        || m.atr_14.is_some();
    if !any {
        return None;
    }

    let mut score = 50.0;

    if let Some(rsi) = m.rsi_14 {
        if rsi < 30.0 {
            score += 15.0; // oversold — contrarian entry
        } else if rsi > 70.0 {
            score -= 10.0; // overbought
        } else {
            score += 5.0;
        }
    }

    if let Some(macd) = m.macd {
        if macd > 0.0 {
            score += 10.0;
        } else {
            score -= 5.0;
        }
    }

    if let (Some(sma_50), Some(sma_200)) = (m.sma_50, m.sma_200) {
        // Golden/death cross, only counted when the reference price agrees
        // with the direction of the cross.
        let confirmed = |above: bool| match reference_price {
            Some(price) => {
                if above {
                    price > sma_200
                } else {
                    price < sma_200
                }
            }
            None => true,
        };
        if sma_50 > sma_200 && confirmed(true) {
            score += 15.0;
        } else if sma_50 < sma_200 && confirmed(false) {
            score -= 10.0;
        }
    }

    if let (Some(volume), Some(market_cap)) = (m.volume_24h_usd, m.market_cap_usd) {
        if market_cap > 0.0 {
            let ratio = volume / market_cap;
            if ratio > 0.05 {
                score += 10.0;
            } else if ratio < 0.01 {
                score -= 10.0;
            }
        }
    }

    if let Some(atr) = m.atr_14 {
        if atr < 5.0 {
            score += 5.0; // calm volatility
        }
    }

    Some(clamp_score(score))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_metrics_is_unavailable() {
        assert!(score(&TokenMetrics::default(), Some(100.0)).is_none());
    }

    #[test]
    fn oversold_uptrend_scores_high() {
        let m = TokenMetrics {
            rsi_14: Some(25.0),
            macd: Some(1.2),
            sma_50: Some(110.0),
            sma_200: Some(100.0),
            volume_24h_usd: Some(60e6),
            market_cap_usd: Some(1e9),
            atr_14: Some(3.0),
            ..Default::default()
        };
        // 50 + 15 + 10 + 15 + 10 + 5 = 105 → clamped
        assert_eq!(score(&m, Some(120.0)), Some(100.0));
    }

    #[test]
    fn overbought_downtrend_scores_low() {
        let m = TokenMetrics {
            rsi_14: Some(80.0),
            macd: Some(-0.5),
            sma_50: Some(90.0),
            sma_200: Some(100.0),
            ..Default::default()
        };
        // 50 - 10 - 5 - 10 = 25
        assert_eq!(score(&m, Some(85.0)), Some(25.0));
    }

    #[test]
    fn cross_not_counted_when_reference_price_disagrees() {
        let m = TokenMetrics {
            rsi_14: Some(50.0),
            sma_50: Some(110.0),
            sma_200: Some(100.0),
            ..Default::default()
        };
        // Price below SMA-200: golden cross unconfirmed, only the RSI band.
        assert_eq!(score(&m, Some(95.0)), Some(55.0));
        // Price above: the +15 applies.
        assert_eq!(score(&m, Some(120.0)), Some(70.0));
    }

    #[test]
    fn vwap_reference_resists_spot_spike() {
        // Post-crash: spot fell below SMA-200 but VWAP holds above it.
        let m = TokenMetrics {
            rsi_14: Some(50.0),
            sma_50: Some(95.0),
            sma_200: Some(100.0),
            ..Default::default()
        };
        let spot = score(&m, Some(80.0)).unwrap(); // death cross confirmed
        let vwap = score(&m, Some(101.0)).unwrap(); // unconfirmed
        assert!(vwap > spot);
    }
}
