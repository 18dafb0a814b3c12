// =============================================================================
// Signal Classifier — Final grade → discrete trading signal
// =============================================================================
//
// Pure threshold lookup. Boundary values belong to the higher bucket
// (a grade of exactly 65 is BUY, not HOLD). Stateless and deterministic:
// the same grade always maps to the same signal, with no hysteresis
// across repeated calls.
// =============================================================================

use crate::rules::SignalThresholds;
use crate::types::Signal;

/// Map an integer grade to its signal bucket.
pub fn classify(score: u32, thresholds: &SignalThresholds) -> Signal {
    let score = score as f64;
    if score >= thresholds.strong_buy {
        Signal::StrongBuy
    } else if score >= thresholds.buy {
        Signal::Buy
    } else if score >= thresholds.hold {
        Signal::Hold
    } else if score >= thresholds.sell {
        Signal::Sell
    } else {
        Signal::StrongSell
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries_belong_to_higher_bucket() {
        let t = SignalThresholds::default();
        assert_eq!(classify(80, &t), Signal::StrongBuy);
        assert_eq!(classify(79, &t), Signal::Buy);
        assert_eq!(classify(65, &t), Signal::Buy);
        assert_eq!(classify(64, &t), Signal::Hold);
        assert_eq!(classify(50, &t), Signal::Hold);
        assert_eq!(classify(49, &t), Signal::Sell);
        assert_eq!(classify(35, &t), Signal::Sell);
        assert_eq!(classify(34, &t), Signal::StrongSell);
        assert_eq!(classify(0, &t), Signal::StrongSell);
        assert_eq!(classify(100, &t), Signal::StrongBuy);
    }

    #[test]
    fn classification_is_monotonic() {
        let t = SignalThresholds::default();
        for a in 0..100u32 {
            let lower = classify(a, &t);
            let higher = classify(a + 1, &t);
            assert!(
                higher.bullishness() >= lower.bullishness(),
                "signal({}) more bullish than signal({})",
                a,
                a + 1
            );
        }
    }
}
