// =============================================================================
// Error Taxonomy — Scoring Engine
// =============================================================================
//
// Only two conditions are actual errors:
//
//   Configuration — the rule document is missing, unparseable, or violates a
//                   structural invariant. Fatal at startup; a failed hot
//                   reload leaves the previous rules active.
//   InvalidInput  — a snapshot or context is structurally malformed (empty
//                   symbol, non-finite numeric). Rejected before scoring.
//
// Missing factor data is NOT an error: it degrades confidence and is recorded
// in the result. Out-of-range factor values are NOT an error: they are
// clamped, logged, and recorded.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// Invalid or missing rule document. Never raised during scoring.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Structurally malformed snapshot or market context.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ScoreError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
