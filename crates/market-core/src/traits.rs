use crate::{CandleSeries, MarketError, Ticker};
use async_trait::async_trait;

/// A daily-candle history provider. Implementations do pure data fetch:
/// no fallback logic, no caching.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the daily series for a ticker, ascending by date. An empty
    /// series is a valid "no data" answer, not an error.
    async fn fetch_series(&self, ticker: &Ticker) -> Result<CandleSeries, MarketError>;
}
