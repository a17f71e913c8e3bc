use chrono::NaiveDate;
use market_core::{Candle, CandleSeries, MarketError, SeriesSource, Ticker};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str =
    "http://apis.data.go.kr/1160100/service/GetStockSecuritiesInfoService/getStockPriceInfo";

/// Primary source: the data.go.kr public stock price API. Returns daily
/// rows with string-encoded numbers, newest first.
#[derive(Clone)]
pub struct DataGoClient {
    api_key: Option<String>,
    client: Client,
}

impl DataGoClient {
    /// `api_key` is optional: without one the portal is skipped entirely
    /// and every fetch reports an empty series.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, client }
    }

    fn parse_row(row: &Value) -> Option<Candle> {
        let date = NaiveDate::parse_from_str(row.get("basDt")?.as_str()?, "%Y%m%d").ok()?;
        let num = |key: &str| -> Option<f64> { row.get(key)?.as_str()?.parse().ok() };
        Some(Candle {
            date,
            open: num("mkp")?,
            high: num("hipr")?,
            low: num("lopr")?,
            close: num("clpr")?,
            volume: num("trqu")?,
        })
    }
}

#[async_trait::async_trait]
impl SeriesSource for DataGoClient {
    fn name(&self) -> &'static str {
        "data.go.kr"
    }

    async fn fetch_series(&self, ticker: &Ticker) -> Result<CandleSeries, MarketError> {
        let Some(api_key) = &self.api_key else {
            return Ok(CandleSeries::empty());
        };

        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("serviceKey", api_key.as_str()),
                ("numOfRows", "300"),
                ("pageNo", "1"),
                ("resultType", "json"),
                ("likeSrtnCd", &ticker.code),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketError::Transport(format!(
                "data.go.kr HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        let items = body
            .pointer("/response/body/items/item")
            .and_then(Value::as_array);

        // Rows arrive newest first; malformed rows are skipped, not fatal.
        let bars: Vec<Candle> = items
            .map(|rows| rows.iter().rev().filter_map(Self::parse_row).collect())
            .unwrap_or_default();

        Ok(CandleSeries::new(bars))
    }
}
