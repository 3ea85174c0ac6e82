use crate::config::AppConfig;
use crate::finder::batch::{BatchReport, BatchSettings};
use crate::finder::settlement::{ExchangeClock, SettlementGate};
use crate::market_data::MarketDataProvider;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub requests_served: AtomicU64,
    pub symbols_resolved: AtomicU64,
    pub symbols_skipped: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            symbols_resolved: AtomicU64::new(0),
            symbols_skipped: AtomicU64::new(0),
        }
    }

    pub fn record(&self, report: &BatchReport) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.symbols_resolved
            .fetch_add(report.results.len() as u64, Ordering::Relaxed);
        self.symbols_skipped
            .fetch_add(report.skipped.len() as u64, Ordering::Relaxed);
    }
}

// ── Application shared state (no locks, no shared caches) ──

pub struct AppState {
    pub config: AppConfig,
    pub provider: Arc<dyn MarketDataProvider>,
    pub clock: Arc<dyn ExchangeClock>,
    pub gate: SettlementGate,
    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn ExchangeClock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            provider,
            clock,
            gate: SettlementGate::default(),
            counters: PerfCounters::new(),
        })
    }

    pub fn batch_settings(&self, min_days: Option<i64>) -> BatchSettings {
        BatchSettings {
            min_days: min_days.unwrap_or(self.config.min_days_to_expiration),
            max_settlement_wait: Duration::from_secs(self.config.max_settlement_wait_secs),
            max_concurrent: self.config.max_concurrent_symbols,
        }
    }
}
