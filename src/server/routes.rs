use crate::config::parse_symbols;
use crate::finder::batch::{self, BatchReport};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct OptionsQuery {
    /// Comma-separated; defaults to the configured list.
    pub symbols: Option<String>,
    pub min_days: Option<i64>,
}

/// GET /api/options -- select contracts for the requested underlyings.
/// The settlement pause is an async sleep, so other requests keep running.
pub async fn get_options(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OptionsQuery>,
) -> Json<BatchReport> {
    let symbols = params
        .symbols
        .as_deref()
        .map(parse_symbols)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.config.symbols.clone());
    let settings = state.batch_settings(params.min_days);

    let report = batch::run_batch(
        state.provider.as_ref(),
        state.clock.as_ref(),
        &state.gate,
        &symbols,
        &settings,
    )
    .await;

    state.counters.record(&report);
    Json(report)
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "requests_served": state.counters.requests_served.load(Relaxed),
        "symbols_resolved": state.counters.symbols_resolved.load(Relaxed),
        "symbols_skipped": state.counters.symbols_skipped.load(Relaxed),
    }))
}
