use crate::finder::expiration::ExpirationEntry;
use crate::finder::strikes::{OptionChain, OptionSide, StrikeQuote};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

// ── Expiration chain ──

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationChainResponse {
    pub expiration_list: Option<Vec<ExpirationEntry>>,
}

// ── Option chain ──

/// `"<date>:<dte>" -> "<strike>" -> contracts`, in the order the provider sent them.
pub type ExpDateMap = IndexMap<String, IndexMap<String, Vec<OptionContract>>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainResponse {
    pub underlying_price: Option<Decimal>,
    #[serde(default)]
    pub call_exp_date_map: ExpDateMap,
    #[serde(default)]
    pub put_exp_date_map: ExpDateMap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub put_call: Option<String>,
    pub symbol: Option<String>,
    pub strike_price: Option<Decimal>,
}

impl OptionContract {
    #[inline]
    fn is_side(&self, side: OptionSide) -> bool {
        match side {
            OptionSide::Call => self.put_call.as_deref() == Some("CALL"),
            OptionSide::Put => self.put_call.as_deref() == Some("PUT"),
        }
    }
}

impl OptionChainResponse {
    /// Flattens both maps into per-side quote lists. Only contracts whose
    /// `putCall` matches the map's side are kept. Map keys are walked in
    /// provider order, so the first listing of a repeated strike wins.
    pub fn into_chain(self) -> OptionChain {
        OptionChain {
            call_strikes: flatten_side(&self.call_exp_date_map, OptionSide::Call),
            put_strikes: flatten_side(&self.put_exp_date_map, OptionSide::Put),
            underlying_price: self.underlying_price,
        }
    }
}

fn flatten_side(map: &ExpDateMap, side: OptionSide) -> Vec<StrikeQuote> {
    let mut out = Vec::new();
    for strikes in map.values() {
        for (strike_key, contracts) in strikes {
            for contract in contracts.iter().filter(|c| c.is_side(side)) {
                let Some(symbol) = contract.symbol.as_deref() else {
                    continue;
                };
                let Some(strike_price) = contract
                    .strike_price
                    .or_else(|| Decimal::from_str(strike_key).ok())
                else {
                    tracing::debug!(strike = %strike_key, symbol, "unparseable strike key, skipping");
                    continue;
                };
                out.push(StrikeQuote {
                    strike_price,
                    contract_symbol: symbol.to_string(),
                    side,
                });
            }
        }
    }
    out
}

// ── Quotes ──

/// Keyed by the requested symbol.
pub type QuotesResponse = HashMap<String, QuoteEnvelope>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub quote: Option<QuoteFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFields {
    pub last_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_JSON: &str = r#"{
        "symbol": "SPY",
        "status": "SUCCESS",
        "underlyingPrice": 631.5,
        "callExpDateMap": {
            "2026-10-19:3": {
                "630.0": [
                    {"putCall": "CALL", "symbol": "SPY   261019C00630000", "strikePrice": 630.0, "bid": 3.1, "ask": 3.2},
                    {"putCall": "CALL", "symbol": "SPY   261019C00630000-DUP", "strikePrice": 630.0}
                ],
                "631.0": [
                    {"putCall": "PUT", "symbol": "MISFILED", "strikePrice": 631.0},
                    {"putCall": "CALL", "symbol": "SPY   261019C00631000"}
                ]
            }
        },
        "putExpDateMap": {
            "2026-10-19:3": {
                "632.0": [
                    {"putCall": "PUT", "symbol": "SPY   261019P00632000", "strikePrice": 632.0}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_expiration_chain() {
        let json = r#"{"expirationList": [
            {"expirationDate": "2026-10-19", "daysToExpiration": 3, "expirationType": "W", "standard": true},
            {"expirationDate": "2026-10-16", "daysToExpiration": 0}
        ]}"#;
        let resp: ExpirationChainResponse = serde_json::from_str(json).unwrap();
        let list = resp.expiration_list.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].expiration_date, "2026-10-19");
        assert_eq!(list[0].days_to_expiration, 3);
    }

    #[test]
    fn test_chain_flattens_by_side() {
        let resp: OptionChainResponse = serde_json::from_str(CHAIN_JSON).unwrap();
        let chain = resp.into_chain();

        assert_eq!(chain.underlying_price, Some(Decimal::from_str("631.5").unwrap()));

        let calls: Vec<&str> = chain.call_strikes.iter().map(|q| q.contract_symbol.as_str()).collect();
        assert_eq!(
            calls,
            vec!["SPY   261019C00630000", "SPY   261019C00630000-DUP", "SPY   261019C00631000"]
        );
        assert!(chain.call_strikes.iter().all(|q| q.side == OptionSide::Call));

        // strike taken from the map key when the contract omits it
        assert_eq!(chain.call_strikes[2].strike_price, Decimal::from(631));

        assert_eq!(chain.put_strikes.len(), 1);
        assert_eq!(chain.put_strikes[0].strike_price, Decimal::from(632));
    }

    #[test]
    fn test_chain_keeps_provider_key_order() {
        let json = r#"{
            "callExpDateMap": {
                "2026-10-19:3": {
                    "999.0": [{"putCall": "CALL", "symbol": "C999"}],
                    "631.0": [{"putCall": "CALL", "symbol": "C631-FIRST"}],
                    "1000.0": [{"putCall": "CALL", "symbol": "C1000"}],
                    "631": [{"putCall": "CALL", "symbol": "C631-SECOND"}]
                }
            }
        }"#;
        let resp: OptionChainResponse = serde_json::from_str(json).unwrap();
        let chain = resp.into_chain();

        let calls: Vec<&str> = chain.call_strikes.iter().map(|q| q.contract_symbol.as_str()).collect();
        assert_eq!(calls, vec!["C999", "C631-FIRST", "C1000", "C631-SECOND"]);

        let first_631 = chain
            .call_strikes
            .iter()
            .find(|q| q.strike_price == Decimal::from(631))
            .map(|q| q.contract_symbol.as_str());
        assert_eq!(first_631, Some("C631-FIRST"));
    }

    #[test]
    fn test_chain_missing_maps_is_empty() {
        let resp: OptionChainResponse = serde_json::from_str(r#"{"symbol": "XYZ", "status": "FAILED"}"#).unwrap();
        let chain = resp.into_chain();
        assert!(chain.call_strikes.is_empty());
        assert!(chain.put_strikes.is_empty());
        assert!(chain.underlying_price.is_none());
    }

    #[test]
    fn test_parse_quotes() {
        let json = r#"{"SPY": {"symbol": "SPY", "quote": {"lastPrice": 631.5, "bidPrice": 631.49, "askPrice": 631.51}}}"#;
        let resp: QuotesResponse = serde_json::from_str(json).unwrap();
        let last = resp.get("SPY").and_then(|e| e.quote.as_ref()).and_then(|q| q.last_price);
        assert_eq!(last, Some(Decimal::from_str("631.5").unwrap()));
    }
}
