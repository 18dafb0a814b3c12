// =============================================================================
// Fundamentals Scorer — Market cap, TVL, development activity
// =============================================================================

use super::{clamp_score, TokenMetrics};

/// Score fundamentals on [0, 100]. Returns `None` when no fundamental
/// metric is available at all.
pub fn score(m: &TokenMetrics) -> Option<f64> {
    let any = m.market_cap_usd.is_some()
        || m.tvl_usd.is_some()
        || m.github_commits_90d.is_some()
        || m.github_stars.is_some();
    if !any {
        return None;
    }

    let mut score = 50.0;

    if let Some(market_cap) = m.market_cap_usd {
        if market_cap > 1e9 {
            score += 20.0;
        } else if market_cap > 100e6 {
            score += 15.0;
        } else if market_cap > 10e6 {
            score += 10.0;
        }
    }

    if let Some(tvl) = m.tvl_usd {
        if tvl > 500e6 {
            score += 15.0;
        } else if tvl > 100e6 {
            score += 10.0;
        } else if tvl > 10e6 {
            score += 5.0;
        }
    }

    if let Some(commits) = m.github_commits_90d {
        if commits > 200 {
            score += 15.0;
        } else if commits > 100 {
            score += 10.0;
        } else if commits > 50 {
            score += 5.0;
        }
    }

    if let Some(stars) = m.github_stars {
        if stars > 20_000 {
            score += 10.0;
        } else if stars > 5_000 {
            score += 5.0;
        }
    }

    Some(clamp_score(score))
}
