use crate::errors::{FinderError, FinderResult};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Resolve the configured symbols once, print the report, exit.
    Batch,
    /// Serve selections over HTTP.
    Serve,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub access_token: String,
    pub market_data_base_url: String,
    pub symbols: Vec<String>,
    pub min_days_to_expiration: i64,
    pub strike_count: u32,
    pub exchange_tz: Tz,
    pub max_settlement_wait_secs: u64,
    pub max_concurrent_symbols: usize,
    pub run_mode: RunMode,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> FinderResult<Self> {
        dotenvy::dotenv().ok();

        let min_days_to_expiration = env_var_or("MIN_DAYS_TO_EXPIRATION", "2")
            .parse::<i64>()
            .map_err(|e| FinderError::Config(format!("MIN_DAYS_TO_EXPIRATION: {e}")))?;

        let strike_count = env_var_or("STRIKE_COUNT", "8")
            .parse::<u32>()
            .map_err(|e| FinderError::Config(format!("STRIKE_COUNT: {e}")))?;

        let exchange_tz = env_var_or("EXCHANGE_TZ", "America/New_York")
            .parse::<Tz>()
            .map_err(|e| FinderError::Config(format!("EXCHANGE_TZ: {e}")))?;

        let max_settlement_wait_secs = env_var_or("MAX_SETTLEMENT_WAIT_SECS", "60")
            .parse::<u64>()
            .map_err(|e| FinderError::Config(format!("MAX_SETTLEMENT_WAIT_SECS: {e}")))?;

        let max_concurrent_symbols = env_var_or("MAX_CONCURRENT_SYMBOLS", "1")
            .parse::<usize>()
            .map_err(|e| FinderError::Config(format!("MAX_CONCURRENT_SYMBOLS: {e}")))?
            .max(1);

        let run_mode = parse_run_mode(&env_var_or("RUN_MODE", "batch"))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| FinderError::Config(format!("SERVER_PORT: {e}")))?;

        let symbols = parse_symbols(&env_var_or("SYMBOLS", "SPY,QQQ"));
        if symbols.is_empty() {
            return Err(FinderError::Config("SYMBOLS: no symbols given".into()));
        }

        Ok(Self {
            access_token: env_var("SCHWAB_ACCESS_TOKEN")?,
            market_data_base_url: env_var_or(
                "SCHWAB_BASE_URL",
                "https://api.schwabapi.com/marketdata/v1",
            ),
            symbols,
            min_days_to_expiration,
            strike_count,
            exchange_tz,
            max_settlement_wait_secs,
            max_concurrent_symbols,
            run_mode,
            server_port,
        })
    }
}

/// Splits a comma-separated symbol list, trimming and upper-casing entries.
/// Blank entries are dropped.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_run_mode(raw: &str) -> FinderResult<RunMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "batch" => Ok(RunMode::Batch),
        "serve" => Ok(RunMode::Serve),
        other => Err(FinderError::Config(format!("RUN_MODE: unknown mode {other}"))),
    }
}

fn env_var(key: &str) -> FinderResult<String> {
    std::env::var(key).map_err(|_| FinderError::Config(format!("missing env var: {key}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_trims_and_uppercases() {
        assert_eq!(parse_symbols(" spy, QQQ ,,iwm"), vec!["SPY", "QQQ", "IWM"]);
    }

    #[test]
    fn test_parse_symbols_empty() {
        assert!(parse_symbols(" , ").is_empty());
    }

    #[test]
    fn test_run_mode() {
        assert_eq!(parse_run_mode("Serve").unwrap(), RunMode::Serve);
        assert_eq!(parse_run_mode("batch").unwrap(), RunMode::Batch);
        assert!(parse_run_mode("daemon").is_err());
    }
}
