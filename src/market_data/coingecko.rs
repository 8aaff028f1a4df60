// =============================================================================
// CoinGecko REST API Client: daily market chart
// =============================================================================
//
// One public, unauthenticated endpoint:
//
//   GET /coins/{id}/market_chart?vs_currency=usd&days={n}&interval=daily
//
// Response shape (only `prices` is read):
//
//   { "prices": [[epoch_ms, price], ...], "market_caps": [...], ... }
//
// Each request is a single attempt bounded by the client timeout. Any
// transport error, non-success status or unexpected payload is surfaced as
// a fetch failure; there are no retries.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{Asset, MarketDataSource};
use crate::error::{AdviserError, Result};
use crate::types::PriceSeries;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Quote currency. Advice and charts label every price in USD.
const VS_CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    /// Create a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crypto-adviser/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AdviserError::fetch_failure(format!("failed to build HTTP client: {e}"))
            })?;

        debug!(base_url = %base_url, ?timeout, "CoinGeckoClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full market-chart URL for `asset` over `days`.
    pub fn market_chart_url(&self, asset: &Asset, days: u32) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            self.base_url, asset.id, VS_CURRENCY, days
        )
    }

    /// GET /coins/{id}/market_chart and return the raw `(epoch_ms, price)` pairs.
    #[instrument(skip(self), fields(asset = %asset.id), name = "coingecko::market_chart")]
    pub async fn get_market_chart(&self, asset: &Asset, days: u32) -> Result<Vec<(i64, f64)>> {
        if days == 0 {
            return Err(AdviserError::invalid_input("lookback must be at least 1 day"));
        }

        let url = self.market_chart_url(asset, days);

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "market_chart returned non-success status");
            return Err(AdviserError::fetch_failure(format!(
                "CoinGecko GET /coins/{}/market_chart returned {}: {}",
                asset.id,
                status,
                truncate(&body, 200)
            )));
        }

        let body: Value = resp.json().await?;
        let pairs = parse_market_chart(&body)?;

        debug!(count = pairs.len(), "market chart fetched");
        Ok(pairs)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_daily_prices(&self, asset: &Asset, days: u32) -> Result<PriceSeries> {
        let pairs = self.get_market_chart(asset, days).await?;
        PriceSeries::from_epoch_millis(&pairs)
    }
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Extract `(epoch_ms, price)` pairs from a market-chart response body.
///
/// A missing or non-array `prices` field, or an entry that is not a
/// `[number, number]` pair, is a fetch failure. An empty array is returned
/// as-is; the caller decides what an empty history means.
pub fn parse_market_chart(body: &Value) -> Result<Vec<(i64, f64)>> {
    let raw = body
        .get("prices")
        .and_then(Value::as_array)
        .ok_or_else(|| AdviserError::fetch_failure("response has no 'prices' array"))?;

    let mut pairs = Vec::with_capacity(raw.len());
    for (i, entry) in raw.iter().enumerate() {
        let arr = entry
            .as_array()
            .filter(|a| a.len() >= 2)
            .ok_or_else(|| {
                AdviserError::fetch_failure(format!("prices[{i}] is not a [timestamp, price] pair"))
            })?;

        let ts = arr[0]
            .as_i64()
            .or_else(|| arr[0].as_f64().and_then(integral_millis))
            .filter(|&ms| DateTime::<Utc>::from_timestamp_millis(ms).is_some())
            .ok_or_else(|| {
                AdviserError::fetch_failure(format!(
                    "prices[{i}] has an invalid timestamp: {}",
                    arr[0]
                ))
            })?;
        let price = arr[1].as_f64().ok_or_else(|| {
            AdviserError::fetch_failure(format!("prices[{i}] has a non-numeric price"))
        })?;

        pairs.push((ts, price));
    }

    Ok(pairs)
}

/// Whole-millisecond float inside the `i64` range, without saturating.
fn integral_millis(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> CoinGeckoClient {
        CoinGeckoClient::new("https://example.test/api/v3/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn url_has_daily_interval_and_no_double_slash() {
        let asset = crate::market_data::resolve_asset("ethereum").unwrap();
        assert_eq!(
            client().market_chart_url(&asset, 30),
            "https://example.test/api/v3/coins/ethereum/market_chart?vs_currency=usd&days=30&interval=daily"
        );
    }

    #[test]
    fn parses_integer_and_float_timestamps() {
        let body = json!({
            "prices": [
                [1717200000000_i64, 67500.5],
                [1717286400000.0, 67800.25]
            ],
            "market_caps": [],
            "total_volumes": []
        });
        let pairs = parse_market_chart(&body).unwrap();
        assert_eq!(pairs, vec![(1717200000000, 67500.5), (1717286400000, 67800.25)]);
    }

    #[test]
    fn missing_prices_is_fetch_failure() {
        let err = parse_market_chart(&json!({ "error": "coin not found" })).unwrap_err();
        assert!(matches!(err, AdviserError::FetchFailure(_)));
    }

    #[test]
    fn malformed_entry_is_fetch_failure() {
        for body in [
            json!({ "prices": [[1717200000000_i64]] }),
            json!({ "prices": [[1717200000000_i64, "67500"]] }),
            json!({ "prices": ["oops"] }),
        ] {
            assert!(matches!(
                parse_market_chart(&body),
                Err(AdviserError::FetchFailure(_))
            ));
        }
    }

    #[test]
    fn out_of_range_or_fractional_timestamp_is_fetch_failure() {
        for body in [
            json!({ "prices": [[1e20, 5.0], [1e20, 6.0]] }),
            json!({ "prices": [[-1e20, 5.0]] }),
            json!({ "prices": [[1717200000000.5, 5.0]] }),
            json!({ "prices": [[i64::MAX, 5.0]] }),
        ] {
            assert!(matches!(
                parse_market_chart(&body),
                Err(AdviserError::FetchFailure(_))
            ));
        }
    }

    #[test]
    fn empty_prices_parse_but_make_an_invalid_series() {
        let pairs = parse_market_chart(&json!({ "prices": [] })).unwrap();
        assert!(pairs.is_empty());
        assert!(matches!(
            PriceSeries::from_epoch_millis(&pairs),
            Err(AdviserError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn zero_days_is_rejected_before_any_request() {
        let asset = crate::market_data::resolve_asset("bitcoin").unwrap();
        let err = client().get_market_chart(&asset, 0).await.unwrap_err();
        assert!(matches!(err, AdviserError::InvalidInput(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
