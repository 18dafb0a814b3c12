// =============================================================================
// Central Application State — Polaris Crypto Scanner
// =============================================================================
//
// Ties the immutable rule snapshot, the demo data provider, and the recent
// results ring buffer together for the API layer.
//
// Thread safety:
//   - The active rules live behind `RwLock<Arc<RuleSet>>`. Scoring clones
//     the Arc and works on an immutable snapshot; a hot reload builds a new
//     RuleSet and swaps the single reference. In-flight requests keep the
//     rules they started with — no field is ever mutated in place.
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the results ring buffer.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::engine::{ScoreResult, ScoringEngine};
use crate::error::ScoreError;
use crate::providers::DemoDataProvider;
use crate::rules::RuleSet;

/// Maximum number of recent score results to retain.
const MAX_RECENT_SCORES: usize = 100;

/// Shared across all request handlers via `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter, bumped on every rules swap
    /// and recorded score.
    pub state_version: AtomicU64,

    /// The active rule snapshot. Swapped atomically on reload.
    pub rules: RwLock<Arc<RuleSet>>,

    /// Where the rule document lives on disk, for reloads.
    pub rules_path: PathBuf,

    /// Upstream boundary: assembles snapshots and market context.
    pub provider: DemoDataProvider,

    /// Ring buffer of recent score results, newest last.
    pub recent_scores: RwLock<Vec<ScoreResult>>,

    /// Instant the service started, for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(rules: RuleSet, rules_path: impl Into<PathBuf>) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            rules: RwLock::new(Arc::new(rules)),
            rules_path: rules_path.into(),
            provider: DemoDataProvider::default(),
            recent_scores: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    /// Clone the current rule snapshot. Cheap: one Arc bump.
    pub fn current_rules(&self) -> Arc<RuleSet> {
        self.rules.read().clone()
    }

    /// Score `symbol` end to end: assemble the snapshot via the provider,
    /// run the engine against the current rule snapshot, record the result.
    pub fn score_symbol(&self, symbol: &str) -> Result<ScoreResult, ScoreError> {
        let rules = self.current_rules();
        let engine = ScoringEngine::new(rules);

        let snapshot = self.provider.snapshot(symbol);
        let context = self.provider.market_context();

        let result = engine.score(&snapshot, &context)?;
        self.push_score(result.clone());
        Ok(result)
    }

    /// Rebuild the rules from disk and swap the active snapshot. An invalid
    /// document leaves the current rules untouched.
    pub fn reload_rules(&self) -> Result<(), ScoreError> {
        match RuleSet::load(&self.rules_path) {
            Ok(fresh) => {
                *self.rules.write() = Arc::new(fresh);
                self.increment_version();
                info!(path = %self.rules_path.display(), "rules reloaded and swapped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rules reload rejected; keeping active rules");
                Err(e)
            }
        }
    }

    /// Validate `fresh`, persist it to disk (atomic tmp + rename), and swap
    /// the active snapshot. An invalid document changes nothing, on disk or
    /// in memory.
    pub fn replace_rules(&self, fresh: RuleSet) -> Result<(), ScoreError> {
        fresh.validate()?;
        fresh.save(&self.rules_path).map_err(|e| {
            ScoreError::configuration(format!(
                "failed to persist rules to {}: {e}",
                self.rules_path.display()
            ))
        })?;

        *self.rules.write() = Arc::new(fresh);
        self.increment_version();
        info!(path = %self.rules_path.display(), "rules replaced and persisted");
        Ok(())
    }

    /// Record a result. The ring buffer is capped at [`MAX_RECENT_SCORES`];
    /// oldest entries are evicted when the limit is reached.
    pub fn push_score(&self, result: ScoreResult) {
        let mut scores = self.recent_scores.write();
        scores.push(result);
        while scores.len() > MAX_RECENT_SCORES {
            scores.remove(0);
        }
        drop(scores);

        self.increment_version();
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_symbol_records_result() {
        let state = AppState::new(RuleSet::default(), "scoring_rules.json");
        let before = state.current_state_version();

        let result = state.score_symbol("BTC").unwrap();
        assert_eq!(result.symbol, "BTC");
        assert_eq!(state.recent_scores.read().len(), 1);
        assert!(state.current_state_version() > before);
    }

    #[test]
    fn ring_buffer_is_capped() {
        let state = AppState::new(RuleSet::default(), "scoring_rules.json");
        for i in 0..(MAX_RECENT_SCORES + 20) {
            let _ = state.score_symbol(&format!("TOK{i}"));
        }
        assert_eq!(state.recent_scores.read().len(), MAX_RECENT_SCORES);
    }

    #[test]
    fn failed_reload_keeps_active_rules() {
        let state = AppState::new(RuleSet::default(), "/nonexistent/rules.json");
        let before = state.current_rules();

        assert!(state.reload_rules().is_err());
        assert!(Arc::ptr_eq(&before, &state.current_rules()));
    }

    fn scratch_rules_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("polaris-rules-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn replace_rules_persists_and_swaps() {
        let path = scratch_rules_path();
        let state = AppState::new(RuleSet::default(), &path);

        let mut fresh = RuleSet::default();
        fresh.edge_cases.stablecoin_max_score = 55.0;
        state.replace_rules(fresh).unwrap();

        assert_eq!(
            state.current_rules().edge_cases.stablecoin_max_score,
            55.0
        );
        // The document round-trips through disk.
        let reloaded = RuleSet::load(&path).unwrap();
        assert_eq!(reloaded.edge_cases.stablecoin_max_score, 55.0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_replacement_changes_nothing() {
        let path = scratch_rules_path();
        let state = AppState::new(RuleSet::default(), &path);

        let mut bad = RuleSet::default();
        bad.base_weights.technicals = 0.9; // sum no longer 1.0
        assert!(state.replace_rules(bad).is_err());

        assert!(!path.exists());
        assert_eq!(state.current_rules().base_weights.technicals, 0.25);
    }

    #[test]
    fn inflight_snapshot_survives_swap() {
        let state = AppState::new(RuleSet::default(), "scoring_rules.json");
        let held = state.current_rules();

        *state.rules.write() = Arc::new(RuleSet::default());
        // The held snapshot is still valid and unchanged.
        assert_eq!(held.signal_thresholds.buy, 65.0);
        assert!(!Arc::ptr_eq(&held, &state.current_rules()));
    }
}
