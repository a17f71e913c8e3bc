use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    /// Both upstream sources returned zero rows for the ticker.
    #[error("no market data available for {0}")]
    UpstreamUnavailable(String),

    /// Network-level failure talking to an upstream. Treated like an empty
    /// result for fallback purposes and never surfaced verbatim.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed candle data (e.g. a zero previous close).
    #[error("invalid candle series: {0}")]
    InvalidSeries(String),
}
