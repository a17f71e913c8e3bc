use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Korean exchange a ticker trades on. The wire tags and provider symbol
/// suffixes are fixed by the existing presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Market {
    #[default]
    #[serde(rename = "KOSPI")]
    Kospi,
    #[serde(rename = "KOSDAQ")]
    Kosdaq,
}

impl Market {
    /// Yahoo-style symbol suffix for this exchange.
    pub fn suffix(&self) -> &'static str {
        match self {
            Market::Kospi => ".KS",
            Market::Kosdaq => ".KQ",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
        }
    }
}

/// Immutable identity of a traded equity. Used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub code: String,
    pub market: Market,
}

impl Ticker {
    pub fn new(code: impl Into<String>, market: Market) -> Self {
        Self {
            code: code.into(),
            market,
        }
    }

    /// Provider symbol with the exchange suffix, e.g. `247540.KQ`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.code, self.market.suffix())
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.open > self.close
    }

    /// Absolute body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Midpoint of the candle body.
    pub fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }
}

/// Ordered daily series, ascending by date with unique dates. Never mutated
/// after construction; derived views borrow it read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    /// Build a series from bars in any order; sorts ascending and drops
    /// duplicate dates (keeping the first occurrence).
    pub fn new(mut bars: Vec<Candle>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self(bars)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn bars(&self) -> &[Candle] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.0.last()
    }

    /// The last `n` bars (fewer when the series is shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        &self.0[self.0.len().saturating_sub(n)..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.0.iter().map(|b| b.close).collect()
    }
}

/// Trailing moving averages for one series snapshot. `None` when the series
/// has fewer bars than the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ma120: Option<f64>,
}

impl IndicatorSet {
    /// Available MAs ordered shortest window first.
    pub fn available(&self) -> Vec<f64> {
        [self.ma5, self.ma10, self.ma20, self.ma60, self.ma120]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Bearish,
}

/// One detected candlestick pattern. Created fresh per analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub signal: Signal,
    pub confidence: f64,
    pub volume_surge: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub trend: Trend,
    pub label: String,
    pub strength: u8,
}

/// Buy-side trade report. Present only when composition criteria are met;
/// never emitted with placeholder values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyReport {
    pub signal_strength: u8,
    pub primary_pattern: String,
    pub primary_pattern_desc: String,
    pub aggressive_entry: f64,
    pub conservative_entry: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub risk_reward: f64,
    pub volume_note: String,
    pub entry_tip: String,
}

/// Sell-side trade report, mirrored from [`BuyReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellReport {
    pub signal_strength: u8,
    pub primary_pattern: String,
    pub primary_pattern_desc: String,
    pub sell_price: f64,
    pub conservative_sell: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub risk_reward: f64,
    pub volume_note: String,
    pub exit_tip: String,
}

/// After-hours (NXT) session snapshot. Attached to a quote only when an
/// after-hours session exists for the ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NxtQuote {
    pub nxt_available: bool,
    pub nxt_status: String,
    pub nxt_time: String,
    pub nxt_price: f64,
    pub nxt_change: f64,
    pub nxt_change_pct: f64,
    pub nxt_high: f64,
    pub nxt_low: f64,
    pub nxt_volume: f64,
}

/// Normalized quote payload for `GET /api/stock`. Field names are fixed by
/// the existing presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub code: String,
    pub market: Market,
    pub name: String,
    pub date: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub industry: String,
    pub company_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nxt: Option<NxtQuote>,
}

/// One bar of the chart payload in `GET /api/analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentCandle {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub is_bullish: bool,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ma120: Option<f64>,
}

/// One-line commentary for a single recent session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNote {
    pub date: String,
    pub desc: String,
}

/// Full technical-analysis payload for `GET /api/analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub code: String,
    pub market: Market,
    pub name: String,
    pub trend: Trend,
    pub trend_label: String,
    pub trend_strength: u8,
    pub patterns: Vec<Pattern>,
    pub recent_candles: Vec<RecentCandle>,
    pub recent_week_analysis: Vec<DailyNote>,
    pub volume_note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_report: Option<BuyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_report: Option<SellReport>,
}

/// Metadata gathered by the enrichment coordinator. Always fully populated,
/// with fixed defaults substituted for failed lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrichment {
    pub industry: String,
    pub company_summary: String,
}

/// One roster entry for the suggest/search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub name: String,
    pub code: String,
    pub market: Market,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(date: &str, close: f64) -> Candle {
        Candle {
            date: date.parse().unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn symbol_uses_market_suffix() {
        assert_eq!(Ticker::new("005930", Market::Kospi).symbol(), "005930.KS");
        assert_eq!(Ticker::new("247540", Market::Kosdaq).symbol(), "247540.KQ");
    }

    #[test]
    fn series_sorts_and_dedups_by_date() {
        let series = CandleSeries::new(vec![
            candle("2024-03-05", 3.0),
            candle("2024-03-04", 2.0),
            candle("2024-03-05", 9.0),
            candle("2024-03-01", 1.0),
        ]);

        let dates: Vec<String> = series.bars().iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, ["2024-03-01", "2024-03-04", "2024-03-05"]);
        // First occurrence of the duplicate date wins
        assert_eq!(series.latest().unwrap().close, 3.0);
    }

    #[test]
    fn candle_shape_helpers() {
        let c = Candle {
            date: "2024-03-05".parse().unwrap(),
            open: 100.0,
            high: 112.0,
            low: 96.0,
            close: 108.0,
            volume: 1.0,
        };
        assert!(c.is_bullish());
        assert_eq!(c.body(), 8.0);
        assert_eq!(c.upper_shadow(), 4.0);
        assert_eq!(c.lower_shadow(), 4.0);
        assert_eq!(c.range(), 16.0);
        assert_eq!(c.body_mid(), 104.0);
    }

    #[test]
    fn indicator_set_available_preserves_window_order() {
        let set = IndicatorSet {
            ma5: Some(105.0),
            ma10: Some(103.0),
            ma20: None,
            ma60: Some(98.0),
            ma120: None,
        };
        assert_eq!(set.available(), vec![105.0, 103.0, 98.0]);
    }
}
