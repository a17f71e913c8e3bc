use chrono::DateTime;
use market_core::{Candle, CandleSeries, MarketError, SeriesSource, Ticker};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Fallback source: the Yahoo Finance chart API, queried by suffixed
/// symbol (`005930.KS`, `247540.KQ`).
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<QuoteArrays>,
}

/// Parallel arrays; a slot is `None` for halted/partial sessions.
#[derive(Deserialize)]
struct QuoteArrays {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

impl YahooClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(crate::USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    fn collect_bars(result: ChartResult) -> Vec<Candle> {
        let timestamps = result.timestamp.unwrap_or_default();
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Vec::new();
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            // Null slots are skipped wholesale
            let (Some(open), Some(high), Some(low), Some(close)) = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            ) else {
                continue;
            };
            bars.push(Candle {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
            });
        }
        bars
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SeriesSource for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_series(&self, ticker: &Ticker) -> Result<CandleSeries, MarketError> {
        let url = format!("{}/{}", BASE_URL, ticker.symbol());

        let response = self
            .client
            .get(&url)
            .query(&[("range", "2y"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketError::Transport(format!(
                "yahoo HTTP {}",
                response.status()
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        let bars = body
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .map(Self::collect_bars)
            .unwrap_or_default();

        Ok(CandleSeries::new(bars))
    }
}
