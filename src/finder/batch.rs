use super::expiration::select_expiration;
use super::settlement::{wait_for_settlement, ExchangeClock, SettlementGate};
use super::strikes::{select_strikes, StrikeSelection};
use crate::market_data::MarketDataProvider;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// Contracts found for one underlying. Built fresh per request, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub expiration_date: String,
    pub reference_price: Decimal,
    pub calls: Vec<String>,
    pub puts: Vec<String>,
    pub selected_call_strikes: Vec<i64>,
    pub selected_put_strikes: Vec<i64>,
}

impl SymbolResult {
    fn from_selection(symbol: &str, expiration_date: String, selection: StrikeSelection) -> Self {
        let (selected_call_strikes, calls) = selection.calls.into_iter().unzip();
        let (selected_put_strikes, puts) = selection.puts.into_iter().unzip();
        Self {
            symbol: symbol.to_string(),
            expiration_date,
            reference_price: selection.reference_price,
            calls,
            puts,
            selected_call_strikes,
            selected_put_strikes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoExpiration,
    NoReferencePrice,
    NoMatchingStrikes,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoExpiration => write!(f, "no expiration available"),
            Self::NoReferencePrice => write!(f, "no reference price available"),
            Self::NoMatchingStrikes => write!(f, "no target strike listed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub expiration_date: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Found(SymbolResult),
    Skipped(SkippedSymbol),
}

/// Aggregate over a batch, in input order. Skips are recorded, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub results: Vec<SymbolResult>,
    pub skipped: Vec<SkippedSymbol>,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    pub min_days: i64,
    pub max_settlement_wait: Duration,
    /// 1 processes symbols strictly one after another.
    pub max_concurrent: usize,
}

/// Runs the full pipeline for one underlying:
/// expiration -> chain -> settlement pause -> reference price -> strikes.
pub async fn resolve_symbol(
    provider: &dyn MarketDataProvider,
    clock: &dyn ExchangeClock,
    gate: &SettlementGate,
    symbol: &str,
    settings: &BatchSettings,
) -> SymbolOutcome {
    let expirations = provider.fetch_expirations(symbol).await;
    let Some(expiration) = select_expiration(&expirations, settings.min_days) else {
        return skipped(symbol, None, SkipReason::NoExpiration);
    };
    let expiration_date = expiration.expiration_date.clone();
    tracing::info!(
        symbol = %symbol,
        expiration = %expiration_date,
        dte = expiration.days_to_expiration,
        "expiration selected"
    );

    // A missing chain behaves like an empty one; the embedded price is lost too.
    let chain = provider
        .fetch_chain(symbol, &expiration_date)
        .await
        .unwrap_or_default();

    let delay = gate.delay_from_clock(clock);
    wait_for_settlement(delay, settings.max_settlement_wait).await;

    let sample = provider.fetch_reference_price(symbol).await;
    if let Some(s) = &sample {
        tracing::debug!(symbol = %symbol, price = %s.value, source = ?s.source, "reference price sampled");
    }

    let Some(selection) = select_strikes(&chain, sample.as_ref()) else {
        return skipped(symbol, Some(expiration_date), SkipReason::NoReferencePrice);
    };
    if selection.is_empty() {
        return skipped(symbol, Some(expiration_date), SkipReason::NoMatchingStrikes);
    }

    tracing::debug!(symbol = %symbol, window = ?selection.window, "target strikes");
    let result = SymbolResult::from_selection(symbol, expiration_date, selection);
    tracing::info!(
        symbol = %symbol,
        reference = %result.reference_price,
        calls = result.calls.len(),
        puts = result.puts.len(),
        "contracts selected"
    );
    SymbolOutcome::Found(result)
}

/// Resolves every symbol, `max_concurrent` at a time, keeping input order.
/// A failing symbol never stops the rest.
pub async fn run_batch(
    provider: &dyn MarketDataProvider,
    clock: &dyn ExchangeClock,
    gate: &SettlementGate,
    symbols: &[String],
    settings: &BatchSettings,
) -> BatchReport {
    // Collected first so the returned future stays Send.
    let pending: Vec<_> = symbols
        .iter()
        .map(|symbol| resolve_symbol(provider, clock, gate, symbol, settings))
        .collect();
    let outcomes: Vec<SymbolOutcome> = stream::iter(pending)
        .buffered(settings.max_concurrent.max(1))
        .collect()
        .await;

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            SymbolOutcome::Found(r) => report.results.push(r),
            SymbolOutcome::Skipped(s) => report.skipped.push(s),
        }
    }
    report
}

fn skipped(symbol: &str, expiration_date: Option<String>, reason: SkipReason) -> SymbolOutcome {
    tracing::warn!(symbol = %symbol, reason = %reason, "skipping symbol");
    SymbolOutcome::Skipped(SkippedSymbol {
        symbol: symbol.to_string(),
        expiration_date,
        reason,
    })
}
