// =============================================================================
// Chat Responder — ScoreResult → readable analysis text
// =============================================================================
//
// Pure formatting over results the engine already produced. Nothing here
// recomputes or overrides score, signal, or confidence; intent detection is
// deliberately out of scope (consumers call the typed endpoints directly).
// =============================================================================

use crate::engine::ScoreResult;
use crate::rules::RuleSet;
use crate::types::{FactorScore, MarketContext, Regime};

/// Render the full analysis block for one token.
pub fn format_analysis(result: &ScoreResult) -> String {
    let mut out = format!("📊 {} Analysis\n", result.symbol);
    out.push_str(&format!("Overall Score: {}/100\n", result.score));
    out.push_str(&format!(
        "- Fundamentals: {}\n",
        factor_line(&result.factors.fundamentals)
    ));
    out.push_str(&format!(
        "- Technicals: {}\n",
        factor_line(&result.factors.technicals)
    ));
    out.push_str(&format!(
        "- Sentiment: {}\n",
        factor_line(&result.factors.sentiment)
    ));
    out.push_str(&format!(
        "- Smart Money: {}\n",
        factor_line(&result.factors.smart_money)
    ));
    out.push_str(&format!("Signal: {}\n", result.signal));
    out.push_str(&format!("Confidence: {:.1}%\n", result.confidence));
    out.push_str(&format!("Regime: {}\n", result.regime));

    if !result.notes.is_empty() {
        out.push_str("Adjustments:\n");
        for note in &result.notes {
            out.push_str(&format!("  - {note}\n"));
        }
    }

    out.push_str(&result.reasoning);
    out.push('\n');
    out
}

fn factor_line(fs: &FactorScore) -> String {
    if fs.excluded {
        "excluded".to_string()
    } else if !fs.available {
        "N/A".to_string()
    } else if fs.anomalous {
        format!("{:.0}/100 (clamped)", fs.value)
    } else {
        format!("{:.0}/100", fs.value)
    }
}

/// Render a ranked comparison of multiple results. The input order is
/// preserved by the caller; ranking here is by score, best first.
pub fn format_comparison(results: &[ScoreResult]) -> String {
    let mut ranked: Vec<&ScoreResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let mut out = String::from("📈 Token Comparison\n");
    for (rank, result) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} — {}/100, {}, confidence {:.1}%\n",
            rank + 1,
            result.symbol,
            result.score,
            result.signal,
            result.confidence
        ));
    }
    if let Some(best) = ranked.first() {
        out.push_str(&format!("Best ranked: {}\n", best.symbol));
    }
    out
}

/// Render the market overview block.
pub fn format_market_overview(context: &MarketContext, regime: Regime) -> String {
    let mut out = String::from("🌐 Market Overview\n");
    match context.btc_dominance_pct {
        Some(d) => out.push_str(&format!("BTC Dominance: {d:.1}%\n")),
        None => out.push_str("BTC Dominance: N/A\n"),
    }
    if let Some(mcap) = context.total_market_cap_usd {
        out.push_str(&format!("Total Market Cap: ${:.2}T\n", mcap / 1e12));
    }
    out.push_str(&format!("Regime: {regime}\n"));
    out
}

/// Render the methodology explainer from the active rules.
pub fn format_methodology(rules: &RuleSet) -> String {
    let w = &rules.base_weights;
    let mut out = String::from("📚 Scoring Methodology\n\n");
    out.push_str("Tokens are graded 0-100 across four dimensions:\n");
    out.push_str(&format!(
        "- Fundamentals ({:.0}%): market cap, TVL, development activity\n",
        w.fundamentals * 100.0
    ));
    out.push_str(&format!(
        "- Technicals ({:.0}%): momentum, trend, volume patterns\n",
        w.technicals * 100.0
    ));
    out.push_str(&format!(
        "- Sentiment ({:.0}%): social volume, news and community tone\n",
        w.sentiment * 100.0
    ));
    out.push_str(&format!(
        "- Smart Money ({:.0}%): whale flows, exchange netflow, holder spread\n",
        w.smart_money * 100.0
    ));
    out.push_str(
        "Weights shift with the market regime, and edge cases (stablecoins, new \
         listings, flash crashes, thin markets) adjust the result explicitly.\n",
    );
    let t = &rules.signal_thresholds;
    out.push_str(&format!(
        "Signals: STRONG BUY ≥{:.0}, BUY ≥{:.0}, HOLD ≥{:.0}, SELL ≥{:.0}, else STRONG SELL.\n",
        t.strong_buy, t.buy, t.hold, t.sell
    ));
    out
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScoringEngine;
    use crate::providers::DemoDataProvider;
    use std::sync::Arc;

    fn result_for(symbol: &str) -> ScoreResult {
        let provider = DemoDataProvider::default();
        let engine = ScoringEngine::new(Arc::new(RuleSet::default()));
        engine
            .score(&provider.snapshot(symbol), &provider.market_context())
            .unwrap()
    }

    #[test]
    fn analysis_contains_all_sections() {
        let text = format_analysis(&result_for("BTC"));
        assert!(text.contains("BTC Analysis"));
        assert!(text.contains("Overall Score:"));
        assert!(text.contains("Signal:"));
        assert!(text.contains("Confidence:"));
    }

    #[test]
    fn excluded_factor_renders_as_excluded() {
        let text = format_analysis(&result_for("USDT"));
        assert!(text.contains("- Technicals: excluded"));
        assert!(text.contains("reserve backing"));
    }

    #[test]
    fn comparison_ranks_by_score() {
        let a = result_for("BTC");
        let b = result_for("MICRO");
        let text = format_comparison(&[b.clone(), a.clone()]);
        let winner = if a.score >= b.score { &a } else { &b };
        assert!(text.contains(&format!("Best ranked: {}", winner.symbol)));
        assert!(text.starts_with("📈"));
    }

    #[test]
    fn methodology_reflects_rule_document() {
        let mut rules = RuleSet::default();
        rules.base_weights.fundamentals = 0.40;
        rules.base_weights.technicals = 0.20;
        rules.base_weights.sentiment = 0.20;
        rules.base_weights.smart_money = 0.20;
        let text = format_methodology(&rules);
        assert!(text.contains("Fundamentals (40%)"));
        assert!(text.contains("STRONG BUY ≥80"));
    }
}
