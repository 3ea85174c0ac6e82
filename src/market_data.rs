use crate::finder::expiration::ExpirationEntry;
use crate::finder::strikes::{OptionChain, PriceSample};
use crate::schwab::client::MarketDataClient;
use async_trait::async_trait;

/// Outbound port to the market-data provider.
///
/// Failures collapse to absence at this boundary: an outage and an empty
/// answer degrade selection the same way, so callers only see "nothing".
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Expiration list for `symbol`, empty on any failure.
    async fn fetch_expirations(&self, symbol: &str) -> Vec<ExpirationEntry>;

    /// Chain snapshot for a single expiration.
    async fn fetch_chain(&self, symbol: &str, expiration_date: &str) -> Option<OptionChain>;

    /// Last-trade reference price.
    async fn fetch_reference_price(&self, symbol: &str) -> Option<PriceSample>;
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn fetch_expirations(&self, symbol: &str) -> Vec<ExpirationEntry> {
        match self.get_expiration_chain(symbol).await {
            Ok(resp) => resp.expiration_list.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "expiration chain fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_chain(&self, symbol: &str, expiration_date: &str) -> Option<OptionChain> {
        match self.get_option_chain(symbol, expiration_date).await {
            Ok(resp) => Some(resp.into_chain()),
            Err(e) => {
                tracing::warn!(
                    symbol = %symbol,
                    expiration = %expiration_date,
                    error = %e,
                    "option chain fetch failed"
                );
                None
            }
        }
    }

    async fn fetch_reference_price(&self, symbol: &str) -> Option<PriceSample> {
        let quotes = match self.get_quotes(symbol).await {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "quote fetch failed");
                return None;
            }
        };

        let last = quotes
            .get(symbol)
            .and_then(|env| env.quote.as_ref())
            .and_then(|q| q.last_price)
            .map(PriceSample::last)
            .filter(|s| s.is_usable());

        if last.is_none() {
            tracing::debug!(symbol = %symbol, "no usable last price in quote");
        }
        last
    }
}
