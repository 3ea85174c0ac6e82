/// Error types for the collaborator and startup layers.
/// Selection itself never fails: missing data is `None` or a `SkipReason`.
/// The finder must:
/// - Keep processing the batch when one symbol's data is unavailable
/// - Abort only on startup errors (config, bind)
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("market data API error: {status} {body}")]
    MarketDataApi { status: u16, body: String },

    #[error("auth error: {0}")]
    Auth(String),

    #[error("config error: {0}")]
    Config(String),

    #[cfg_attr(not(test), allow(dead_code))]
    #[error("clock error: {0}")]
    Clock(String),
}

impl From<reqwest::Error> for FinderError {
    fn from(e: reqwest::Error) -> Self {
        FinderError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for FinderError {
    fn from(e: serde_json::Error) -> Self {
        FinderError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for FinderError {
    fn from(e: std::io::Error) -> Self {
        FinderError::Network(e.to_string())
    }
}

pub type FinderResult<T> = Result<T, FinderError>;
