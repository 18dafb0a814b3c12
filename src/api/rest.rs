// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All scoring endpoints live under `/api/v1/`. Handlers format and transport
// what the engine produced; they never recompute or override score, signal,
// or confidence.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::chat;
use crate::engine::weights::derive_regime;
use crate::error::ScoreError;
use crate::rules::RuleSet;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/score/:token", get(score_token))
        .route("/api/v1/score/:token/analysis", get(score_analysis))
        .route("/api/v1/compare", post(compare_tokens))
        .route("/api/v1/market/overview", get(market_overview))
        .route("/api/v1/rules", get(get_rules).put(update_rules))
        .route("/api/v1/rules/reload", post(reload_rules))
        .route("/api/v1/scores/recent", get(recent_scores))
        .layer(cors)
        .with_state(state)
}

fn error_response(err: &ScoreError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": err.to_string() })),
    )
}

// =============================================================================
// Service banner & health
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "Polaris Crypto Scanner",
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "score_token": "/api/v1/score/{token}",
            "score_analysis": "/api/v1/score/{token}/analysis",
            "compare": "/api/v1/compare",
            "market_overview": "/api/v1/market/overview",
            "rules": "/api/v1/rules",
            "recent_scores": "/api/v1/scores/recent",
            "health": "/health"
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "polaris-scanner",
        "uptime_seconds": state.uptime_seconds(),
        "state_version": state.current_state_version(),
    }))
}

// =============================================================================
// Scoring
// =============================================================================

async fn score_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match state.score_symbol(&token) {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!(token = %token, error = %e, "scoring request rejected");
            error_response(&e).into_response()
        }
    }
}

async fn score_analysis(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match state.score_symbol(&token) {
        Ok(result) => Json(json!({
            "token": result.symbol,
            "analysis": chat::format_analysis(&result),
        }))
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[derive(Deserialize)]
struct CompareRequest {
    tokens: Vec<String>,
}

async fn compare_tokens(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompareRequest>,
) -> impl IntoResponse {
    if request.tokens.len() < 2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "compare requires at least two tokens" })),
        )
            .into_response();
    }

    // Each invocation is independent and side-effect-free; failures for one
    // token do not block the rest.
    let mut results = Vec::with_capacity(request.tokens.len());
    let mut rejected = Vec::new();
    for token in &request.tokens {
        match state.score_symbol(token) {
            Ok(result) => results.push(result),
            Err(e) => rejected.push(json!({ "token": token, "error": e.to_string() })),
        }
    }

    let mut ranked = results.clone();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    Json(json!({
        "comparison": chat::format_comparison(&results),
        "ranked": ranked,
        "rejected": rejected,
    }))
    .into_response()
}

// =============================================================================
// Market, rules, history
// =============================================================================

async fn market_overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rules = state.current_rules();
    let context = state.provider.market_context();
    let regime = derive_regime(&context, &rules);

    Json(json!({
        "context": context,
        "regime": regime,
        "overview": chat::format_market_overview(&context, regime),
        "methodology": chat::format_methodology(&rules),
    }))
}

async fn get_rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.current_rules().as_ref().clone())
}

async fn update_rules(
    State(state): State<Arc<AppState>>,
    Json(fresh): Json<RuleSet>,
) -> impl IntoResponse {
    match state.replace_rules(fresh) {
        Ok(()) => Json(json!({
            "status": "updated",
            "state_version": state.current_state_version(),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "rules update rejected");
            error_response(&e).into_response()
        }
    }
}

async fn reload_rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.reload_rules() {
        Ok(()) => Json(json!({
            "status": "reloaded",
            "state_version": state.current_state_version(),
        }))
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn recent_scores(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scores = state.recent_scores.read().clone();
    Json(scores)
}
