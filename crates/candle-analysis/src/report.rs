use crate::indicators::{compute_indicators, rolling_sma, MA_WINDOWS};
use crate::patterns::PatternDetector;
use crate::signals::{compose_buy_report, compose_sell_report};
use crate::trend::classify_trend;
use market_core::{
    BuyReport, CandleSeries, DailyNote, Pattern, RecentCandle, SellReport, Trend, TrendAssessment,
};

/// Bars shorter than this produce an empty neutral analysis.
const MIN_ANALYSIS_BARS: usize = 10;
/// Chart payload depth.
const RECENT_CANDLE_COUNT: usize = 60;
const WEEK_BARS: usize = 5;

const LABEL_TOO_SHORT: &str = "중립 (데이터 부족)";

/// Everything the analysis endpoint derives from one series. Identity
/// fields (code, market, name) are attached by the caller.
pub struct Analysis {
    pub patterns: Vec<Pattern>,
    pub trend: TrendAssessment,
    pub volume_note: String,
    pub buy_report: Option<BuyReport>,
    pub sell_report: Option<SellReport>,
    pub recent_candles: Vec<RecentCandle>,
    pub recent_week_analysis: Vec<DailyNote>,
}

pub fn analyze(series: &CandleSeries) -> Analysis {
    if series.len() < MIN_ANALYSIS_BARS {
        return Analysis {
            patterns: Vec::new(),
            trend: TrendAssessment {
                trend: Trend::Neutral,
                label: LABEL_TOO_SHORT.to_string(),
                strength: 50,
            },
            volume_note: String::new(),
            buy_report: None,
            sell_report: None,
            recent_candles: Vec::new(),
            recent_week_analysis: Vec::new(),
        };
    }

    let detection = PatternDetector::new().detect(series);
    let indicators = compute_indicators(series);
    let trend = classify_trend(&indicators, &detection.patterns);
    let buy_report =
        compose_buy_report(series, &detection.patterns, &trend, &detection.volume_note);
    let sell_report =
        compose_sell_report(series, &detection.patterns, &trend, &detection.volume_note);

    Analysis {
        recent_candles: recent_candles(series),
        recent_week_analysis: recent_week(series),
        patterns: detection.patterns,
        trend,
        volume_note: detection.volume_note,
        buy_report,
        sell_report,
    }
}

/// Last 60 bars with per-bar rolling MAs for charting. Dates use the short
/// `%m/%d` form the chart expects.
fn recent_candles(series: &CandleSeries) -> Vec<RecentCandle> {
    let closes = series.closes();
    let rolling: Vec<Vec<Option<f64>>> = MA_WINDOWS
        .iter()
        .map(|&w| rolling_sma(&closes, w))
        .collect();

    let len = series.len();
    let start = len.saturating_sub(RECENT_CANDLE_COUNT);

    series.bars()[start..]
        .iter()
        .enumerate()
        .map(|(offset, candle)| {
            let i = start + offset;
            let ma = |slot: usize| rolling[slot][i].map(|v| v.round());
            RecentCandle {
                date: candle.date.format("%m/%d").to_string(),
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
                is_bullish: candle.is_bullish(),
                ma5: ma(0),
                ma10: ma(1),
                ma20: ma(2),
                ma60: ma(3),
                ma120: ma(4),
            }
        })
        .collect()
}

/// One-line Korean commentary per session for the last trading week:
/// candle color, prior-high breakout, long-wick notes.
fn recent_week(series: &CandleSeries) -> Vec<DailyNote> {
    let bars = series.bars();
    if bars.len() < WEEK_BARS {
        return Vec::new();
    }

    (bars.len() - WEEK_BARS..bars.len())
        .map(|i| {
            let row = &bars[i];
            let prev = if i > 0 { Some(&bars[i - 1]) } else { None };

            let mut desc = String::new();
            if row.is_bullish() {
                desc.push_str("양봉");
                if let Some(prev) = prev {
                    if row.high > prev.high {
                        desc.push_str(" (전일 고점 돌파)");
                    }
                }
            } else if row.is_bearish() {
                desc.push_str("음봉");
                if let Some(prev) = prev {
                    if prev.is_bullish() && row.close < prev.body_mid() {
                        desc.push_str(" (전일 양봉의 절반 이탈)");
                    }
                }
            } else {
                desc.push_str("십자도지(보합)");
            }

            let body = row.body();
            if body > 0.0 {
                if row.upper_shadow() > body * 1.5 {
                    desc.push_str(", 긴 윗꼬리 (단기 매도 압력)");
                }
                if row.lower_shadow() > body * 1.5 {
                    desc.push_str(", 긴 아랫꼬리 (저점 매수세 유입)");
                }
            } else if row.range() > 0.0 {
                if row.upper_shadow() > row.range() * 0.4 {
                    desc.push_str(", 윗꼬리 도지");
                } else if row.lower_shadow() > row.range() * 0.4 {
                    desc.push_str(", 아랫꼬리 도지");
                }
            }

            DailyNote {
                date: row.date.format("%m/%d").to_string(),
                desc,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::Candle;

    fn bar(i: u64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(i))
                .unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn rising_series(n: u64) -> CandleSeries {
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                bar(i, close - 0.5, close + 1.0, close - 1.5, close)
            })
            .collect();
        CandleSeries::new(bars)
    }

    #[test]
    fn short_series_is_neutral_and_empty() {
        let analysis = analyze(&rising_series(6));

        assert_eq!(analysis.trend.trend, Trend::Neutral);
        assert_eq!(analysis.trend.strength, 50);
        assert!(analysis.patterns.is_empty());
        assert!(analysis.buy_report.is_none());
        assert!(analysis.sell_report.is_none());
        assert!(analysis.recent_candles.is_empty());
    }

    #[test]
    fn recent_candles_cap_at_sixty_with_rolling_mas() {
        let analysis = analyze(&rising_series(80));

        assert_eq!(analysis.recent_candles.len(), 60);
        let last = analysis.recent_candles.last().unwrap();
        assert!(last.is_bullish);
        // windows longer than the series stay null
        assert!(last.ma5.is_some());
        assert!(last.ma60.is_some());
        assert!(last.ma120.is_none());
        // mean of closes 175..179 = 177
        assert_eq!(last.ma5, Some(177.0));
        // 2024-01-01 plus 79 days
        assert_eq!(last.date, "03/20");
    }

    #[test]
    fn week_commentary_flags_breakouts() {
        let analysis = analyze(&rising_series(30));

        assert_eq!(analysis.recent_week_analysis.len(), 5);
        for note in &analysis.recent_week_analysis {
            assert!(note.desc.contains("양봉"));
            assert!(note.desc.contains("전일 고점 돌파"));
        }
    }

    #[test]
    fn week_commentary_notes_long_upper_wick() {
        let mut bars: Vec<Candle> = (0..29)
            .map(|i| {
                let close = 100.0 + i as f64;
                bar(i, close - 0.5, close + 1.0, close - 1.5, close)
            })
            .collect();
        // small body with an upper wick over 1.5x the body
        bars.push(bar(29, 129.0, 134.0, 128.8, 129.5));
        let analysis = analyze(&CandleSeries::new(bars));

        let last = analysis.recent_week_analysis.last().unwrap();
        assert!(last.desc.contains("긴 윗꼬리"));
    }

    #[test]
    fn uptrend_series_never_emits_sell_report_without_bearish_trend() {
        let analysis = analyze(&rising_series(40));
        assert!(analysis.sell_report.is_none());
    }
}
