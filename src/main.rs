// =============================================================================
// Polaris Crypto Scanner — Main Entry Point
// =============================================================================
//
// Loads the scoring rules once at startup (fail fast on an invalid document;
// defaults only when the file is absent), builds the shared state, and
// serves the REST API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chat;
mod engine;
mod error;
mod factors;
mod providers;
mod rules;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::rules::RuleSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Polaris Crypto Scanner — Starting Up             ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    // ── 2. Scoring rules ─────────────────────────────────────────────────
    let rules_path =
        std::env::var("POLARIS_RULES_PATH").unwrap_or_else(|_| "scoring_rules.json".into());

    let rules = match RuleSet::load(&rules_path) {
        Ok(rules) => rules,
        Err(e) if !std::path::Path::new(&rules_path).exists() => {
            warn!(path = %rules_path, error = %e, "no rule document found, using defaults");
            RuleSet::default()
        }
        Err(e) => {
            // A present-but-broken document is a configuration error, not
            // something to paper over with defaults.
            return Err(e.into());
        }
    };

    info!(
        strong_buy = rules.signal_thresholds.strong_buy,
        stablecoin_cap = rules.edge_cases.stablecoin_max_score,
        liquidity_floor = rules.edge_cases.low_liquidity_volume_floor_usd,
        "scoring rules active"
    );

    // ── 3. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::new(rules, &rules_path));

    // ── 4. API server ────────────────────────────────────────────────────
    let bind_addr =
        std::env::var("POLARIS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await?;

    info!("Polaris Crypto Scanner shut down complete.");
    Ok(())
}
