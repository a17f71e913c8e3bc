use market_core::{CandleSeries, IndicatorSet, MarketError};

/// Moving-average windows reported per series, shortest first.
pub const MA_WINDOWS: [usize; 5] = [5, 10, 20, 60, 120];

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Per-bar rolling SMA aligned to the input: `None` until the window fills.
pub fn rolling_sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let tail = sma(data, period);
    let lead = data.len().saturating_sub(tail.len());
    let mut result = vec![None; lead];
    result.extend(tail.into_iter().map(Some));
    result
}

/// Trailing MAs over the whole series; a window longer than the series
/// yields `None` for that slot.
pub fn compute_indicators(series: &CandleSeries) -> IndicatorSet {
    let closes = series.closes();
    let last = |period: usize| sma(&closes, period).last().copied();

    IndicatorSet {
        ma5: last(5),
        ma10: last(10),
        ma20: last(20),
        ma60: last(60),
        ma120: last(120),
    }
}

/// Latest close vs previous close: absolute change and percent change
/// rounded to two decimals. A single-bar series reports no movement.
pub fn daily_change(series: &CandleSeries) -> Result<(f64, f64), MarketError> {
    let bars = series.bars();
    let latest = bars
        .last()
        .ok_or_else(|| MarketError::InvalidSeries("empty series".into()))?;

    if bars.len() < 2 {
        return Ok((0.0, 0.0));
    }

    let prev_close = bars[bars.len() - 2].close;
    if prev_close == 0.0 {
        return Err(MarketError::InvalidSeries(
            "zero previous close".into(),
        ));
    }

    let change = latest.close - prev_close;
    let change_pct = (change / prev_close * 100.0 * 100.0).round() / 100.0;
    Ok((change, change_pct))
}
