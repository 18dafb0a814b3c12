// =============================================================================
// Sentiment Scorer — Aggregate sentiment, social volume, mention ratio
// =============================================================================

use super::{clamp_score, TokenMetrics};

/// Score sentiment on [0, 100]. Returns `None` when no sentiment metric is
/// available at all.
pub fn score(m: &TokenMetrics) -> Option<f64> {
    let any = m.sentiment_score.is_some()
        || m.social_volume_24h.is_some()
        || (m.mentions_positive.is_some() && m.mentions_negative.is_some());
    if !any {
        return None;
    }

    let mut score = 50.0;

    if let Some(sentiment) = m.sentiment_score {
        if sentiment > 0.5 {
            score += 20.0;
        } else if sentiment > 0.2 {
            score += 10.0;
        } else if sentiment < -0.5 {
            score -= 20.0;
        } else if sentiment < -0.2 {
            score -= 10.0;
        }
    }

    if let Some(social_volume) = m.social_volume_24h {
        if social_volume > 100_000 {
            score += 10.0;
        } else if social_volume < 1_000 {
            score -= 5.0;
        }
    }

    if let (Some(positive), Some(negative)) = (m.mentions_positive, m.mentions_negative) {
        // +1 guards division by zero on a quiet day.
        let ratio = positive as f64 / (negative as f64 + 1.0);
        if ratio > 3.0 {
            score += 15.0;
        } else if ratio < 0.5 {
            score -= 10.0;
        }
    }

    Some(clamp_score(score))
}
