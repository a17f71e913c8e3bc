use crate::chart;
use market_core::{Candle, CandleSeries, Pattern, Signal};

const CONTEXT_LOOKBACK: usize = 20;
const TREND_LOOKBACK: usize = 5;
/// Latest volume above this multiple of the trailing average counts as a
/// surge and lifts pattern confidence.
pub const VOLUME_SURGE_MULTIPLIER: f64 = 1.5;
const VOLUME_SURGE_BONUS: f64 = 0.1;

/// One candlestick shape rule. Rules are independent and side-effect free;
/// the registry evaluates them in registration order.
pub trait PatternRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern>;
}

/// Close sits in the bottom 30% of the trailing 20-bar range.
fn near_low(series: &CandleSeries, candle: &Candle) -> bool {
    if series.len() < CONTEXT_LOOKBACK {
        return false;
    }
    let recent = series.tail(CONTEXT_LOOKBACK);
    let low = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let high = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let range = high - low;
    if range == 0.0 {
        return false;
    }
    (candle.close - low) / range < 0.3
}

/// Close sits in the top 30% of the trailing 20-bar range.
fn near_high(series: &CandleSeries, candle: &Candle) -> bool {
    if series.len() < CONTEXT_LOOKBACK {
        return false;
    }
    let recent = series.tail(CONTEXT_LOOKBACK);
    let low = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let high = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let range = high - low;
    if range == 0.0 {
        return false;
    }
    (high - candle.close) / range < 0.3
}

/// 5-bar downtrend over the bars preceding the pattern.
fn trend_down(bars: &[Candle]) -> bool {
    if bars.len() < TREND_LOOKBACK + 1 {
        return false;
    }
    let recent = &bars[bars.len() - (TREND_LOOKBACK + 1)..];
    recent[0].close > recent[recent.len() - 1].close
}

fn trend_up(bars: &[Candle]) -> bool {
    if bars.len() < TREND_LOOKBACK + 1 {
        return false;
    }
    let recent = &bars[bars.len() - (TREND_LOOKBACK + 1)..];
    recent[recent.len() - 1].close > recent[0].close
}

pub(crate) fn pattern(name: &str, signal: Signal, confidence: f64, description: &str) -> Pattern {
    Pattern {
        name: name.to_string(),
        signal,
        confidence,
        volume_surge: false,
        description: description.to_string(),
    }
}

// ── single-candle rules ──

pub struct Hammer;

impl PatternRule for Hammer {
    fn name(&self) -> &'static str {
        "망치형 (Hammer)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        if row.lower_shadow() >= body * 2.0
            && row.upper_shadow() <= body * 0.5
            && body / range < 0.4
            && trend_down(&bars[..bars.len() - 1])
        {
            let confidence = if near_low(series, row) { 0.7 } else { 0.5 };
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                confidence,
                "하락 추세 바닥에서 강한 매수세 유입. 장중 급락 후 회복하여 반전 가능성.",
            ));
        }
        None
    }
}

pub struct HangingMan;

impl PatternRule for HangingMan {
    fn name(&self) -> &'static str {
        "교수형 (Hanging Man)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        if row.lower_shadow() >= body * 2.0
            && row.upper_shadow() <= body * 0.5
            && body / range < 0.4
            && trend_up(&bars[..bars.len() - 1])
        {
            let confidence = if near_high(series, row) { 0.6 } else { 0.4 };
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                confidence,
                "상승 추세 고점에서 매수세 약화 경고. 추세 전환 가능성 주시.",
            ));
        }
        None
    }
}

pub struct ShootingStar;

impl PatternRule for ShootingStar {
    fn name(&self) -> &'static str {
        "유성형 (Shooting Star)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        if row.upper_shadow() >= body * 2.0
            && row.lower_shadow() <= body * 0.5
            && body / range < 0.4
            && trend_up(&bars[..bars.len() - 1])
        {
            let confidence = if near_high(series, row) { 0.75 } else { 0.55 };
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                confidence,
                "고점에서 강한 매도 저항. 매수세가 가격을 올렸으나 밀려남. 강력한 하락 신호.",
            ));
        }
        None
    }
}

pub struct InvertedHammer;

impl PatternRule for InvertedHammer {
    fn name(&self) -> &'static str {
        "역망치형 (Inverted Hammer)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        if row.upper_shadow() >= body * 2.0
            && row.lower_shadow() <= body * 0.5
            && body / range < 0.4
            && trend_down(&bars[..bars.len() - 1])
        {
            let confidence = if near_low(series, row) { 0.55 } else { 0.4 };
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                confidence,
                "하락 중 장중 상승 시도 포착. 다음 날 양봉 확인 시 반전 신호.",
            ));
        }
        None
    }
}

pub struct DragonflyDoji;

impl PatternRule for DragonflyDoji {
    fn name(&self) -> &'static str {
        "잠자리형 도지 (Dragonfly Doji)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        // doji: body at most 5% of the full range
        if body / range <= 0.05
            && row.lower_shadow() >= range * 0.6
            && row.upper_shadow() <= range * 0.1
            && trend_down(&bars[..bars.len() - 1])
        {
            let confidence = if near_low(series, row) { 0.8 } else { 0.6 };
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                confidence,
                "시가=종가=고가 부근. 하락 거부 의지가 강력. 추세 전환 가능성 매우 높음.",
            ));
        }
        None
    }
}

pub struct GravestoneDoji;

impl PatternRule for GravestoneDoji {
    fn name(&self) -> &'static str {
        "비석형 도지 (Gravestone Doji)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 6 {
            return None;
        }
        let row = bars.last()?;
        let (body, range) = (row.body(), row.range());
        if range == 0.0 {
            return None;
        }
        if body / range <= 0.05
            && row.upper_shadow() >= range * 0.6
            && row.lower_shadow() <= range * 0.1
            && trend_up(&bars[..bars.len() - 1])
        {
            let confidence = if near_high(series, row) { 0.75 } else { 0.55 };
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                confidence,
                "시가=종가=저가 부근. 고점에서 매도 압력이 압도적. 하락 반전 경고.",
            ));
        }
        None
    }
}

// ── two-candle rules ──

/// Engulfing confidence grades on how much of the candle is body: a full
/// marubozu-style engulfing bar reads stronger than one with long wicks.
fn engulfing_confidence(curr: &Candle, at_extreme: bool) -> f64 {
    let body_ratio = if curr.range() > 0.0 {
        curr.body() / curr.range()
    } else {
        0.0
    };
    let mut confidence = 0.5 + 0.35 * body_ratio;
    if at_extreme {
        confidence += 0.1;
    }
    confidence.min(1.0)
}

pub struct BullishEngulfing;

impl PatternRule for BullishEngulfing {
    fn name(&self) -> &'static str {
        "상승 장악형 (Bullish Engulfing)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 7 {
            return None;
        }
        let prev = &bars[bars.len() - 2];
        let curr = &bars[bars.len() - 1];

        if prev.is_bearish()
            && curr.is_bullish()
            && curr.open <= prev.close
            && curr.close >= prev.open
            && curr.body() > prev.body()
            && trend_down(&bars[..bars.len() - 2])
        {
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                engulfing_confidence(curr, near_low(series, curr)),
                "매수세가 매도세를 완전히 압도. 전일 음봉을 감싸는 양봉 출현. 강력한 반전 신호.",
            ));
        }
        None
    }
}

pub struct BearishEngulfing;

impl PatternRule for BearishEngulfing {
    fn name(&self) -> &'static str {
        "하락 장악형 (Bearish Engulfing)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 7 {
            return None;
        }
        let prev = &bars[bars.len() - 2];
        let curr = &bars[bars.len() - 1];

        if prev.is_bullish()
            && curr.is_bearish()
            && curr.open >= prev.close
            && curr.close <= prev.open
            && curr.body() > prev.body()
            && trend_up(&bars[..bars.len() - 2])
        {
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                engulfing_confidence(curr, near_high(series, curr)),
                "매도세가 시장을 완전히 장악. 전일 양봉을 감싸는 음봉 출현. 하락 반전 경고.",
            ));
        }
        None
    }
}

pub struct PiercingLine;

impl PatternRule for PiercingLine {
    fn name(&self) -> &'static str {
        "관통형 (Piercing Line)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 7 {
            return None;
        }
        let prev = &bars[bars.len() - 2];
        let curr = &bars[bars.len() - 1];

        if prev.is_bearish()
            && curr.is_bullish()
            && curr.open < prev.low
            && curr.close > prev.body_mid()
            && curr.close < prev.open
            && trend_down(&bars[..bars.len() - 2])
        {
            let confidence = if near_low(series, curr) { 0.65 } else { 0.5 };
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                confidence,
                "갭하락 출발 후 전일 음봉 50% 이상 회복. 하락 에너지 소진 신호.",
            ));
        }
        None
    }
}

pub struct DarkCloudCover;

impl PatternRule for DarkCloudCover {
    fn name(&self) -> &'static str {
        "흑운형 (Dark Cloud Cover)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 7 {
            return None;
        }
        let prev = &bars[bars.len() - 2];
        let curr = &bars[bars.len() - 1];

        if prev.is_bullish()
            && curr.is_bearish()
            && curr.open > prev.high
            && curr.close < prev.body_mid()
            && curr.close > prev.open
            && trend_up(&bars[..bars.len() - 2])
        {
            let confidence = if near_high(series, curr) { 0.65 } else { 0.5 };
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                confidence,
                "갭상승 출발 후 전일 양봉 50% 이하로 하락. 상승 분위기 반전 경고.",
            ));
        }
        None
    }
}

// ── three-candle rules ──

pub struct MorningStar;

impl PatternRule for MorningStar {
    fn name(&self) -> &'static str {
        "샛별형 (Morning Star)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 8 {
            return None;
        }
        let d1 = &bars[bars.len() - 3];
        let d2 = &bars[bars.len() - 2];
        let d3 = &bars[bars.len() - 1];

        if d1.is_bearish()
            && d1.body() > 0.0
            && d2.body() < d1.body() * 0.3
            && d3.is_bullish()
            && d3.close > d1.body_mid()
            && trend_down(&bars[..bars.len() - 3])
        {
            let confidence = if near_low(series, d3) { 0.85 } else { 0.7 };
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                confidence,
                "긴 음봉 → 작은 별 → 긴 양봉. 매도세 소멸 후 매수세 유입. 신뢰도 높은 반전 신호.",
            ));
        }
        None
    }
}

pub struct EveningStar;

impl PatternRule for EveningStar {
    fn name(&self) -> &'static str {
        "석별형 (Evening Star)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 8 {
            return None;
        }
        let d1 = &bars[bars.len() - 3];
        let d2 = &bars[bars.len() - 2];
        let d3 = &bars[bars.len() - 1];

        if d1.is_bullish()
            && d1.body() > 0.0
            && d2.body() < d1.body() * 0.3
            && d3.is_bearish()
            && d3.close < d1.body_mid()
            && trend_up(&bars[..bars.len() - 3])
        {
            let confidence = if near_high(series, d3) { 0.85 } else { 0.7 };
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                confidence,
                "긴 양봉 → 작은 별 → 긴 음봉. 매수세 고갈 후 매도세 확인. 신뢰도 높은 하락 신호.",
            ));
        }
        None
    }
}

pub struct ThreeWhiteSoldiers;

impl PatternRule for ThreeWhiteSoldiers {
    fn name(&self) -> &'static str {
        "적삼병 (Three White Soldiers)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 8 {
            return None;
        }
        let d1 = &bars[bars.len() - 3];
        let d2 = &bars[bars.len() - 2];
        let d3 = &bars[bars.len() - 1];

        if d1.is_bullish()
            && d2.is_bullish()
            && d3.is_bullish()
            && d2.close > d1.close
            && d3.close > d2.close
            && d2.open > d1.open
            && d2.open < d1.close
            && d3.open > d2.open
            && d3.open < d2.close
        {
            return Some(pattern(
                self.name(),
                Signal::Bullish,
                0.85,
                "양봉 3연속 출현, 종가가 계속 고점 갱신. 강력한 상승 추세 전환.",
            ));
        }
        None
    }
}

pub struct ThreeBlackCrows;

impl PatternRule for ThreeBlackCrows {
    fn name(&self) -> &'static str {
        "흑삼병 (Three Black Crows)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 8 {
            return None;
        }
        let d1 = &bars[bars.len() - 3];
        let d2 = &bars[bars.len() - 2];
        let d3 = &bars[bars.len() - 1];

        if d1.is_bearish()
            && d2.is_bearish()
            && d3.is_bearish()
            && d2.close < d1.close
            && d3.close < d2.close
            && d2.open < d1.open
            && d2.open > d1.close
            && d3.open < d2.open
            && d3.open > d2.close
        {
            return Some(pattern(
                self.name(),
                Signal::Bearish,
                0.85,
                "음봉 3연속, 종가가 계속 저점 갱신. 본격 하락세 전환 경고.",
            ));
        }
        None
    }
}

/// Detection output: the matched patterns plus the volume context that was
/// applied to them.
pub struct Detection {
    pub patterns: Vec<Pattern>,
    pub volume_ratio: f64,
    pub volume_note: String,
}

/// Fixed-order rule registry with volume-surge confidence adjustment.
pub struct PatternDetector {
    rules: Vec<Box<dyn PatternRule>>,
    volume_multiplier: f64,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(Hammer),
                Box::new(HangingMan),
                Box::new(ShootingStar),
                Box::new(InvertedHammer),
                Box::new(DragonflyDoji),
                Box::new(GravestoneDoji),
                Box::new(BullishEngulfing),
                Box::new(BearishEngulfing),
                Box::new(PiercingLine),
                Box::new(DarkCloudCover),
                Box::new(MorningStar),
                Box::new(EveningStar),
                Box::new(ThreeWhiteSoldiers),
                Box::new(ThreeBlackCrows),
                Box::new(chart::TripleBottom),
                Box::new(chart::TripleTop),
                Box::new(chart::DoubleBottom),
                Box::new(chart::DoubleTop),
                Box::new(chart::HeadAndShoulders),
                Box::new(chart::InverseHeadAndShoulders),
                Box::new(chart::DirectionalTriangle),
                Box::new(chart::VBottom),
                Box::new(chart::RoundingBottom),
                Box::new(chart::RoundingTop),
                Box::new(chart::SymmetricalTriangle),
                Box::new(chart::Rectangle),
                Box::new(chart::Wedge),
                Box::new(chart::FlagPennant),
                Box::new(chart::FibonacciRetracement),
            ],
            volume_multiplier: VOLUME_SURGE_MULTIPLIER,
        }
    }

    fn avg_volume(series: &CandleSeries) -> f64 {
        let bars = series.tail(CONTEXT_LOOKBACK);
        if bars.is_empty() {
            return 0.0;
        }
        bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64
    }

    pub fn detect(&self, series: &CandleSeries) -> Detection {
        let mut patterns: Vec<Pattern> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(series))
            .collect();

        // nothing confirmed: report a still-forming structure instead
        if patterns.is_empty() {
            if let Some(forming) = chart::near_miss(series) {
                patterns.push(forming);
            }
        }

        let avg_volume = Self::avg_volume(series);
        let latest_volume = series.latest().map(|b| b.volume).unwrap_or(0.0);
        let volume_ratio = if avg_volume > 0.0 {
            latest_volume / avg_volume
        } else {
            1.0
        };

        let volume_note = if volume_ratio >= self.volume_multiplier {
            for p in &mut patterns {
                p.confidence = (p.confidence + VOLUME_SURGE_BONUS).min(1.0);
                p.volume_surge = true;
            }
            format!("거래량 {:.1}배 급증 (신뢰도 ↑)", volume_ratio)
        } else {
            format!("거래량 평균 수준 ({:.1}배)", volume_ratio)
        };

        Detection {
            patterns,
            volume_ratio,
            volume_note,
        }
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::Candle;

    fn bar(i: u64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(i))
                .unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Six declining bars then a bearish bar engulfed by a near-marubozu
    /// bullish bar.
    fn engulfing_series(latest_volume: f64) -> CandleSeries {
        let mut bars: Vec<Candle> = (0..6)
            .map(|i| {
                let close = 120.0 - i as f64 * 4.0;
                bar(i, close + 2.0, close + 3.0, close - 1.0, close, 1000.0)
            })
            .collect();
        // prior bearish bar
        bars.push(bar(6, 100.0, 101.0, 96.0, 97.0, 1000.0));
        // engulfing bullish bar, body 10 of range 11 (ratio > 0.9)
        bars.push(bar(7, 96.5, 107.0, 96.0, 106.5, latest_volume));
        CandleSeries::new(bars)
    }

    #[test]
    fn bullish_engulfing_with_full_body_scores_high() {
        let detector = PatternDetector::new();
        let detection = detector.detect(&engulfing_series(1000.0));

        let engulfing = detection
            .patterns
            .iter()
            .find(|p| p.name.contains("Bullish Engulfing"))
            .expect("engulfing should fire");
        assert_eq!(engulfing.signal, Signal::Bullish);
        assert!(engulfing.confidence >= 0.8);
        assert!(engulfing.confidence <= 1.0);
        assert!(!engulfing.volume_surge);
    }

    #[test]
    fn volume_surge_lifts_confidence_and_flags_patterns() {
        let detector = PatternDetector::new();
        let calm = detector.detect(&engulfing_series(1000.0));
        let surged = detector.detect(&engulfing_series(5000.0));

        let base = calm.patterns[0].confidence;
        let lifted = surged.patterns[0].confidence;
        assert!(surged.patterns[0].volume_surge);
        assert!((lifted - (base + 0.1).min(1.0)).abs() < 1e-9);
        assert!(surged.volume_note.contains("급증"));
        assert!(calm.volume_note.contains("평균 수준"));
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = PatternDetector::new();
        let series = engulfing_series(1000.0);
        let a = detector.detect(&series);
        let b = detector.detect(&series);

        let names_a: Vec<&str> = a.patterns.iter().map(|p| p.name.as_str()).collect();
        let names_b: Vec<&str> = b.patterns.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn hammer_requires_downtrend() {
        // hammer shape after an uptrend must not fire as hammer
        let mut bars: Vec<Candle> = (0..6)
            .map(|i| {
                let close = 100.0 + i as f64 * 4.0;
                bar(i, close - 2.0, close + 1.0, close - 3.0, close, 1000.0)
            })
            .collect();
        bars.push(bar(6, 124.0, 124.5, 112.0, 123.0, 1000.0));
        let series = CandleSeries::new(bars);

        let detector = PatternDetector::new();
        let detection = detector.detect(&series);
        assert!(detection.patterns.iter().all(|p| p.name != "망치형 (Hammer)"));
        // the same shape in an uptrend reads as a hanging man instead
        assert!(detection
            .patterns
            .iter()
            .any(|p| p.name == "교수형 (Hanging Man)"));
    }

    #[test]
    fn confidences_stay_in_unit_range() {
        let detector = PatternDetector::new();
        for volume in [500.0, 1000.0, 10_000.0] {
            for p in detector.detect(&engulfing_series(volume)).patterns {
                assert!((0.0..=1.0).contains(&p.confidence), "{}", p.name);
            }
        }
    }

    #[test]
    fn short_series_yields_no_patterns() {
        let bars = vec![bar(0, 100.0, 105.0, 95.0, 101.0, 1000.0)];
        let detection = PatternDetector::new().detect(&CandleSeries::new(bars));
        assert!(detection.patterns.is_empty());
    }
}
