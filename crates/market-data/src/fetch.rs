use market_core::{CandleSeries, MarketError, SeriesSource, Ticker};

/// Sequential acquisition policy: try the primary source, fall through to
/// the fallback on an empty result or transport error. No retries. Both
/// coming back empty is `UpstreamUnavailable`.
pub async fn fetch_with_fallback(
    primary: &dyn SeriesSource,
    fallback: &dyn SeriesSource,
    ticker: &Ticker,
) -> Result<CandleSeries, MarketError> {
    match primary.fetch_series(ticker).await {
        Ok(series) if !series.is_empty() => {
            tracing::debug!(source = primary.name(), code = %ticker.code, bars = series.len(), "series fetched");
            return Ok(series);
        }
        Ok(_) => {
            tracing::debug!(source = primary.name(), code = %ticker.code, "empty result, trying fallback");
        }
        Err(e) => {
            tracing::warn!(source = primary.name(), code = %ticker.code, error = %e, "primary source failed, trying fallback");
        }
    }

    match fallback.fetch_series(ticker).await {
        Ok(series) if !series.is_empty() => {
            tracing::debug!(source = fallback.name(), code = %ticker.code, bars = series.len(), "series fetched");
            Ok(series)
        }
        Ok(_) => Err(MarketError::UpstreamUnavailable(ticker.code.clone())),
        Err(e) => {
            tracing::warn!(source = fallback.name(), code = %ticker.code, error = %e, "fallback source failed");
            Err(MarketError::UpstreamUnavailable(ticker.code.clone()))
        }
    }
}
