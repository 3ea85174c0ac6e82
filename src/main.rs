mod config;
mod errors;
mod finder;
mod market_data;
mod schwab;
mod server;
mod state;

use crate::config::{AppConfig, RunMode};
use crate::finder::batch;
use crate::finder::settlement::SystemClock;
use crate::schwab::client::MarketDataClient;
use crate::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout carries the report in batch mode
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("strike_finder starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let client = MarketDataClient::new(&cfg.market_data_base_url, &cfg.access_token, cfg.strike_count);
    let clock = SystemClock::new(cfg.exchange_tz);
    let app_state = AppState::new(cfg.clone(), Arc::new(client), Arc::new(clock));

    match cfg.run_mode {
        RunMode::Batch => run_once(app_state).await,
        RunMode::Serve => serve(app_state, cfg.server_port).await,
    }
}

/// Resolve the configured symbols once and print the report as JSON.
async fn run_once(state: Arc<AppState>) {
    let settings = state.batch_settings(None);
    tracing::info!(
        symbols = ?state.config.symbols,
        min_days = settings.min_days,
        "resolving option symbols"
    );

    let report = batch::run_batch(
        state.provider.as_ref(),
        state.clock.as_ref(),
        &state.gate,
        &state.config.symbols,
        &settings,
    )
    .await;
    state.counters.record(&report);

    for result in &report.results {
        tracing::info!(
            symbol = %result.symbol,
            expiration = %result.expiration_date,
            calls = ?result.calls,
            puts = ?result.puts,
            "selection"
        );
    }
    for skip in &report.skipped {
        tracing::warn!(symbol = %skip.symbol, reason = %skip.reason, "no contracts selected");
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("report serialization error: {e}"),
    }
}

async fn serve(state: Arc<AppState>, port: u16) {
    let app = axum::Router::new()
        .route("/api/options", axum::routing::get(server::routes::get_options))
        .route("/api/counters", axum::routing::get(server::routes::get_counters))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
