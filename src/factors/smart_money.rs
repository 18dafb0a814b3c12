// =============================================================================
// Smart Money Scorer — Whale activity, exchange flows, holder concentration
// =============================================================================

use super::{clamp_score, TokenMetrics};

/// Score smart-money activity on [0, 100]. Returns `None` when no on-chain
/// metric is available at all.
pub fn score(m: &TokenMetrics) -> Option<f64> {
    let any = m.whale_transactions_24h.is_some()
        || m.exchange_netflow_usd.is_some()
        || m.holder_concentration.is_some();
    if !any {
        return None;
    }

    let mut score = 50.0;

    if let Some(whale_txs) = m.whale_transactions_24h {
        if whale_txs > 50 {
            score += 10.0;
        } else if whale_txs > 20 {
            score += 5.0;
        }
    }

    if let Some(netflow) = m.exchange_netflow_usd {
        if netflow < 0.0 {
            // Net outflow: coins moving to cold storage — accumulation.
            score += 10.0;
        } else if netflow > 10e6 {
            // Heavy inflow: potential sell pressure building.
            score -= 5.0;
        }
    }

    if let Some(concentration) = m.holder_concentration {
        if concentration < 0.3 {
            score += 15.0;
        } else if concentration < 0.5 {
            score += 5.0;
        } else {
            score -= 10.0;
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
        assert!(score(&TokenMetrics::default()).is_none());
    }

    #[test]
    fn accumulation_pattern_scores_high() {
        let m = TokenMetrics {
            whale_transactions_24h: Some(80),
            exchange_netflow_usd: Some(-5e6),
            holder_concentration: Some(0.2),
            ..Default::default()
        };
        // 50 + 10 + 10 + 15 = 85
        assert_eq!(score(&m), Some(85.0));
    }

    #[test]
    fn distribution_with_concentrated_supply_scores_low() {
        let m = TokenMetrics {
            whale_transactions_24h: Some(5),
            exchange_netflow_usd: Some(50e6),
            holder_concentration: Some(0.8),
            ..Default::default()
        };
        // 50 + 0 - 5 - 10 = 35
        assert_eq!(score(&m), Some(35.0));
    }

    #[test]
    fn modest_inflow_is_neutral() {
        let m = TokenMetrics {
            exchange_netflow_usd: Some(1e6),
            ..Default::default()
        };
        assert_eq!(score(&m), Some(50.0));
    }
}
