use crate::errors::FinderResult;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::time::Duration;

/// Official open, seconds after local midnight (09:30:00).
const MARKET_OPEN_SECS: u32 = 9 * 3600 + 30 * 60;
/// Length of the opening-auction window during which quotes are not trusted.
const SETTLEMENT_WINDOW_SECS: u32 = 60;

/// Source of the current exchange-local time.
/// Injected so the gate never reads an ambient clock.
pub trait ExchangeClock: Send + Sync {
    fn now(&self) -> FinderResult<DateTime<Tz>>;
}

/// Wall clock converted into the exchange's time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl ExchangeClock for SystemClock {
    fn now(&self) -> FinderResult<DateTime<Tz>> {
        Ok(Utc::now().with_timezone(&self.tz))
    }
}

/// Decides how long a caller should pause before trusting a quote.
///
/// Weekdays only: inside `[open, open + window)` the remaining time to
/// `open + window` is returned; everywhere else zero. Pure function of `now`.
#[derive(Debug, Clone, Copy)]
pub struct SettlementGate {
    market_open_secs: u32,
    window_secs: u32,
}

impl Default for SettlementGate {
    fn default() -> Self {
        Self {
            market_open_secs: MARKET_OPEN_SECS,
            window_secs: SETTLEMENT_WINDOW_SECS,
        }
    }
}

impl SettlementGate {
    pub fn settlement_delay<Z: TimeZone>(&self, now: &DateTime<Z>) -> Duration {
        // Monday = 0 .. Friday = 4
        if now.weekday().num_days_from_monday() > 4 {
            return Duration::ZERO;
        }

        let secs = now.num_seconds_from_midnight();
        let settled_at = self.market_open_secs + self.window_secs;
        if secs < self.market_open_secs || secs >= settled_at {
            return Duration::ZERO;
        }

        // nanosecond() exceeds 1e9 only inside a leap second
        let nanos = now.nanosecond().min(999_999_999);
        Duration::from_secs(u64::from(settled_at - secs)).saturating_sub(Duration::from_nanos(u64::from(nanos)))
    }

    /// Reads the clock and computes the delay. A clock failure degrades to
    /// zero (treated as already settled) instead of aborting the caller.
    pub fn delay_from_clock(&self, clock: &dyn ExchangeClock) -> Duration {
        match clock.now() {
            Ok(now) => self.settlement_delay(&now),
            Err(e) => {
                tracing::warn!(error = %e, "exchange clock unavailable, assuming settled");
                Duration::ZERO
            }
        }
    }
}

/// Suspends for `delay`, capped at `max_wait`. Cancellable by dropping the future.
pub async fn wait_for_settlement(delay: Duration, max_wait: Duration) {
    let wait = delay.min(max_wait);
    if wait.is_zero() {
        return;
    }
    tracing::info!(wait_ms = wait.as_millis() as u64, "waiting for opening auction to settle");
    tokio::time::sleep(wait).await;
}

/// Clock pinned to one instant, for deterministic tests.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Tz>);

#[cfg(test)]
impl ExchangeClock for FixedClock {
    fn now(&self) -> FinderResult<DateTime<Tz>> {
        Ok(self.0)
    }
}

#[cfg(test)]
pub fn new_york(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
    chrono_tz::America::New_York
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FinderError;

    struct BrokenClock;

    impl ExchangeClock for BrokenClock {
        fn now(&self) -> FinderResult<DateTime<Tz>> {
            Err(FinderError::Clock("no time source".into()))
        }
    }

    // 2026-10-16 is a Friday, 2026-10-17 a Saturday.

    #[test]
    fn test_inside_window_returns_remaining() {
        let gate = SettlementGate::default();
        let delay = gate.settlement_delay(&new_york(2026, 10, 16, 9, 30, 15));
        assert_eq!(delay, Duration::from_secs(45));
    }

    #[test]
    fn test_window_start_is_full_minute() {
        let gate = SettlementGate::default();
        let delay = gate.settlement_delay(&new_york(2026, 10, 16, 9, 30, 0));
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_sub_second_precision() {
        let gate = SettlementGate::default();
        let now = new_york(2026, 10, 16, 9, 30, 59) + chrono::Duration::milliseconds(250);
        assert_eq!(gate.settlement_delay(&now), Duration::from_millis(750));
    }

    #[test]
    fn test_outside_window_is_zero() {
        let gate = SettlementGate::default();
        assert_eq!(gate.settlement_delay(&new_york(2026, 10, 16, 9, 29, 59)), Duration::ZERO);
        assert_eq!(gate.settlement_delay(&new_york(2026, 10, 16, 9, 31, 0)), Duration::ZERO);
        assert_eq!(gate.settlement_delay(&new_york(2026, 10, 16, 15, 0, 0)), Duration::ZERO);
    }

    #[test]
    fn test_weekend_is_zero() {
        let gate = SettlementGate::default();
        assert_eq!(gate.settlement_delay(&new_york(2026, 10, 17, 9, 30, 15)), Duration::ZERO);
        assert_eq!(gate.settlement_delay(&new_york(2026, 10, 18, 9, 30, 15)), Duration::ZERO);
    }

    #[test]
    fn test_uses_exchange_local_time() {
        // 13:30:15 UTC is 09:30:15 in New York during daylight time
        let gate = SettlementGate::default();
        let utc = Utc.with_ymd_and_hms(2026, 10, 16, 13, 30, 15).single().unwrap();
        assert_eq!(gate.settlement_delay(&utc), Duration::ZERO);
        let local = utc.with_timezone(&chrono_tz::America::New_York);
        assert_eq!(gate.settlement_delay(&local), Duration::from_secs(45));
    }

    #[test]
    fn test_clock_failure_degrades_to_zero() {
        let gate = SettlementGate::default();
        assert_eq!(gate.delay_from_clock(&BrokenClock), Duration::ZERO);
    }

    #[test]
    fn test_delay_from_fixed_clock() {
        let gate = SettlementGate::default();
        let clock = FixedClock(new_york(2026, 10, 16, 9, 30, 50));
        assert_eq!(gate.delay_from_clock(&clock), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_wait_is_capped() {
        let started = std::time::Instant::now();
        wait_for_settlement(Duration::from_secs(60), Duration::from_millis(20)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
