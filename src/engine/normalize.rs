// =============================================================================
// Factor Normalizer — Raw factor inputs → validated FactorScores
// =============================================================================
//
// Isolates the rest of the pipeline from malformed upstream data:
//
//   - `None` passes through as missing, never defaulted to a number.
//   - Values outside [0, 100] are clamped and flagged anomalous (logged,
//     not fatal — the confidence model deducts for them later).
//   - Non-finite values are a structural defect of the snapshot and are
//     rejected as InvalidInput before they can poison arithmetic.
// =============================================================================

use tracing::warn;

use crate::error::ScoreError;
use crate::types::{Factor, FactorScore, FactorSet};

/// Normalize one raw factor value.
pub fn normalize_one(
    symbol: &str,
    factor: Factor,
    raw: Option<f64>,
) -> Result<FactorScore, ScoreError> {
    let Some(value) = raw else {
        return Ok(FactorScore::missing());
    };

    if !value.is_finite() {
        return Err(ScoreError::invalid_input(format!(
            "{symbol}: {factor} factor is not a finite number"
        )));
    }

    if (0.0..=100.0).contains(&value) {
        return Ok(FactorScore::available(value, false));
    }

    let clamped = value.clamp(0.0, 100.0);
    warn!(
        symbol = %symbol,
        factor = %factor,
        raw = value,
        clamped = clamped,
        "anomalous factor input clamped to [0, 100]"
    );
    Ok(FactorScore::available(clamped, true))
}

/// Normalize all four raw factor inputs of a snapshot.
pub fn normalize_factors(
    symbol: &str,
    raw: &FactorSet<Option<f64>>,
) -> Result<FactorSet<FactorScore>, ScoreError> {
    Ok(FactorSet {
        fundamentals: normalize_one(symbol, Factor::Fundamentals, raw.fundamentals)?,
        technicals: normalize_one(symbol, Factor::Technicals, raw.technicals)?,
        sentiment: normalize_one(symbol, Factor::Sentiment, raw.sentiment)?,
        smart_money: normalize_one(symbol, Factor::SmartMoney, raw.smart_money)?,
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_value_passes_clean() {
        let fs = normalize_one("BTC", Factor::Fundamentals, Some(72.5)).unwrap();
        assert!(fs.available);
        assert!(!fs.anomalous);
        assert_eq!(fs.value, 72.5);
    }

    #[test]
    fn missing_value_stays_missing() {
        let fs = normalize_one("BTC", Factor::Sentiment, None).unwrap();
        assert!(!fs.available);
        assert!(!fs.anomalous);
    }

    #[test]
    fn out_of_range_is_clamped_and_flagged() {
        let high = normalize_one("BTC", Factor::Technicals, Some(130.0)).unwrap();
        assert!(high.available);
        assert!(high.anomalous);
        assert_eq!(high.value, 100.0);

        let low = normalize_one("BTC", Factor::SmartMoney, Some(-4.0)).unwrap();
        assert!(low.anomalous);
        assert_eq!(low.value, 0.0);
    }

    #[test]
    fn boundary_values_are_not_anomalous() {
        assert!(!normalize_one("BTC", Factor::Fundamentals, Some(0.0))
            .unwrap()
            .anomalous);
        assert!(!normalize_one("BTC", Factor::Fundamentals, Some(100.0))
            .unwrap()
            .anomalous);
    }

    #[test]
    fn non_finite_value_is_rejected() {
        assert!(matches!(
            normalize_one("BTC", Factor::Technicals, Some(f64::NAN)),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(normalize_one("BTC", Factor::Technicals, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn normalize_factors_maps_each_dimension() {
        let raw = FactorSet {
            fundamentals: Some(80.0),
            technicals: None,
            sentiment: Some(120.0),
            smart_money: Some(40.0),
        };
        let set = normalize_factors("SOL", &raw).unwrap();
        assert!(set.fundamentals.available);
        assert!(!set.technicals.available);
        assert!(set.sentiment.anomalous);
        assert_eq!(set.sentiment.value, 100.0);
        assert_eq!(set.smart_money.value, 40.0);
    }
}
