use super::types::*;
use crate::errors::{FinderError, FinderResult};
use reqwest::{Client, StatusCode};

/// Schwab market-data REST client. All methods return Result, never panic.
/// The bearer token is supplied by the caller; refreshing it is out of scope.
#[derive(Clone)]
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    access_token: String,
    strike_count: u32,
}

impl MarketDataClient {
    pub fn new(base_url: &str, access_token: &str, strike_count: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            strike_count,
        }
    }

    async fn bearer_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> FinderResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FinderError::Auth(format!("GET {path}: access token rejected")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FinderError::MarketDataApi {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|e| FinderError::Parse(format!("GET {path}: {e}")))
    }

    pub async fn get_expiration_chain(&self, symbol: &str) -> FinderResult<ExpirationChainResponse> {
        self.bearer_get("/expirationchain", &[("symbol", symbol)]).await
    }

    /// Chain for a single expiration, both sides, `strike_count` strikes around the money.
    pub async fn get_option_chain(
        &self,
        symbol: &str,
        expiration_date: &str,
    ) -> FinderResult<OptionChainResponse> {
        let strike_count = self.strike_count.to_string();
        self.bearer_get(
            "/chains",
            &[
                ("symbol", symbol),
                ("contractType", "ALL"),
                ("strikeCount", strike_count.as_str()),
                ("fromDate", expiration_date),
                ("toDate", expiration_date),
            ],
        )
        .await
    }

    pub async fn get_quotes(&self, symbol: &str) -> FinderResult<QuotesResponse> {
        self.bearer_get("/quotes", &[("symbols", symbol), ("fields", "quote")]).await
    }
}
