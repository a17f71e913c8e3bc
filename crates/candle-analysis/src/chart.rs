//! Multi-candle chart structures: swing-point reversals (double/triple
//! bottoms and tops, head-and-shoulders), consolidation breaks (triangles,
//! rectangles, wedges, flags), rounded turns, and fibonacci retracements.
//! These read the whole series through its local extrema rather than the
//! last few candles.

use market_core::{Candle, CandleSeries, Pattern, Signal};

use crate::patterns::{pattern, PatternRule};

/// Half-width of the swing-point window for the reversal structures.
const SWING_ORDER: usize = 3;
/// Tighter half-width for the consolidation structures, which need more
/// extrema over the same stretch.
const TIGHT_ORDER: usize = 2;

/// Swing highs and lows: a bar is a peak (trough) when its high (low) is
/// the extreme of the surrounding `2 * order + 1` bars. Returned oldest
/// first as `(index, price)` pairs.
fn local_extrema(bars: &[Candle], order: usize) -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
    let mut peaks = Vec::new();
    let mut troughs = Vec::new();
    let n = bars.len();
    if n < 2 * order + 1 {
        return (peaks, troughs);
    }
    for i in order..n - order {
        let window = &bars[i - order..=i + order];
        let high = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        if bars[i].high == high {
            peaks.push((i, bars[i].high));
        }
        if bars[i].low == low {
            troughs.push((i, bars[i].low));
        }
    }
    (peaks, troughs)
}

fn last_values(points: &[(usize, f64)], count: usize) -> Option<Vec<f64>> {
    if points.len() < count {
        return None;
    }
    Some(points[points.len() - count..].iter().map(|p| p.1).collect())
}

fn last_close(bars: &[Candle]) -> f64 {
    bars.last().map(|b| b.close).unwrap_or(0.0)
}

fn vmax(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn vmin(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn vmean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn rising(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

fn falling(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] > w[1])
}

/// Least-squares quadratic fit of `values` against x = 0..n, returning the
/// leading coefficients `(a, b)` of `a·x² + b·x + c`.
fn quadratic_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        t0 += y;
        t1 += x * y;
        t2 += x2 * y;
    }
    let s0 = n as f64;
    // Cramer's rule on the 3x3 normal equations.
    let det = s4 * (s2 * s0 - s1 * s1) - s3 * (s3 * s0 - s1 * s2) + s2 * (s3 * s1 - s2 * s2);
    if det == 0.0 {
        return None;
    }
    let det_a = t2 * (s2 * s0 - s1 * s1) - s3 * (t1 * s0 - s1 * t0) + s2 * (t1 * s1 - s2 * t0);
    let det_b = s4 * (t1 * s0 - s1 * t0) - t2 * (s3 * s0 - s1 * s2) + s2 * (s3 * t0 - s2 * t1);
    Some((det_a / det, det_b / det))
}

// ── swing-point reversals ──

pub struct TripleBottom;

impl PatternRule for TripleBottom {
    fn name(&self) -> &'static str {
        "삼중 바닥형 (Triple Bottom)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (_, troughs) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&troughs, 3)?;
        let avg = vmean(&v);
        if v.iter().all(|x| (x - avg).abs() / avg < 0.03) {
            let close = last_close(bars);
            if close > v[2] && (close - v[2]) / v[2] < 0.08 {
                return Some(pattern(
                    self.name(),
                    Signal::Bullish,
                    0.88,
                    "3번의 바닥 지지 확인. 강력한 매수세 유입 암시 및 상승 에너지 응축 중.",
                ));
            }
        }
        None
    }
}

pub struct TripleTop;

impl PatternRule for TripleTop {
    fn name(&self) -> &'static str {
        "삼중 천장형 (Triple Top)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, _) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&peaks, 3)?;
        let avg = vmean(&v);
        if v.iter().all(|x| (x - avg).abs() / avg < 0.03) {
            let close = last_close(bars);
            if close < v[2] && (v[2] - close) / v[2] < 0.08 {
                return Some(pattern(
                    self.name(),
                    Signal::Bearish,
                    0.88,
                    "3번의 천장 저항 확인. 매수세 소진 및 강력한 매도 압력 형성.",
                ));
            }
        }
        None
    }
}

pub struct DoubleBottom;

impl PatternRule for DoubleBottom {
    fn name(&self) -> &'static str {
        "이중 바닥형 (Double Bottom / 쌍바닥)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 15 {
            return None;
        }
        let (_, troughs) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&troughs, 2)?;
        if (v[0] - v[1]).abs() / v[0].max(v[1]) < 0.03 {
            let close = last_close(bars);
            if close > v[1] && (close - v[1]) / v[1] < 0.08 {
                return Some(pattern(
                    self.name(),
                    Signal::Bullish,
                    0.85,
                    "W자 형태의 전형적인 바닥 다지기. 하락 추세 종료 및 턴어라운드 임박.",
                ));
            }
        }
        None
    }
}

pub struct DoubleTop;

impl PatternRule for DoubleTop {
    fn name(&self) -> &'static str {
        "이중 천장형 (Double Top / 쌍봉)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 15 {
            return None;
        }
        let (peaks, _) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&peaks, 2)?;
        if (v[0] - v[1]).abs() / v[0].max(v[1]) < 0.03 {
            let close = last_close(bars);
            if close < v[1] && (v[1] - close) / v[1] < 0.08 {
                return Some(pattern(
                    self.name(),
                    Signal::Bearish,
                    0.85,
                    "M자 형태의 전형적인 고점 패턴. 단단한 저항대 확인 및 단기 하방 압력 강세.",
                ));
            }
        }
        None
    }
}

pub struct HeadAndShoulders;

impl PatternRule for HeadAndShoulders {
    fn name(&self) -> &'static str {
        "헤드 앤 숄더 (Head & Shoulders)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, _) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&peaks, 3)?;
        if v[1] > v[0] && v[1] > v[2] && (v[0] - v[2]).abs() / v[0].max(v[2]) < 0.05 {
            let close = last_close(bars);
            if close < v[2] {
                return Some(pattern(
                    self.name(),
                    Signal::Bearish,
                    0.90,
                    "왼쪽 어깨, 머리, 오른쪽 어깨를 형성한 최고점 시그널. 강력한 하락세 전환 경고.",
                ));
            }
        }
        None
    }
}

pub struct InverseHeadAndShoulders;

impl PatternRule for InverseHeadAndShoulders {
    fn name(&self) -> &'static str {
        "역 헤드 앤 숄더 (Inverse H&S)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (_, troughs) = local_extrema(bars, SWING_ORDER);
        let v = last_values(&troughs, 3)?;
        if v[1] < v[0] && v[1] < v[2] && (v[0] - v[2]).abs() / v[0].min(v[2]) < 0.05 {
            let close = last_close(bars);
            if close > v[2] {
                return Some(pattern(
                    self.name(),
                    Signal::Bullish,
                    0.90,
                    "역 헤드 앤 숄더 패턴 완성 시도. 하락 추세 종료와 강력한 상승세 시작 가능성.",
                ));
            }
        }
        None
    }
}

pub struct VBottom;

impl PatternRule for VBottom {
    fn name(&self) -> &'static str {
        "V자형 반등 (V-Bottom)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        let n = bars.len();
        if n < 10 {
            return None;
        }
        let recent = &bars[n - 10..];
        let mut min_offset = 0;
        for (i, b) in recent.iter().enumerate() {
            if b.low < recent[min_offset].low {
                min_offset = i;
            }
        }
        let min_val = recent[min_offset].low;
        let min_pos = n - 10 + min_offset;
        let since_low = n - 1 - min_pos;
        if !(1..=4).contains(&since_low) || min_pos == 0 {
            return None;
        }

        let pre_fall = &bars[min_pos.saturating_sub(5)..min_pos];
        let pre_fall_high = pre_fall
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        if (pre_fall_high - min_val) / pre_fall_high > 0.08 {
            let close = last_close(bars);
            if (close - min_val) / (pre_fall_high - min_val) > 0.5 {
                return Some(pattern(
                    self.name(),
                    Signal::Bullish,
                    0.80,
                    "단기 급락 후 과매도 구간(V자 계곡) 탈출. 강력한 재매수 유입 확인.",
                ));
            }
        }
        None
    }
}

// ── rounded turns ──

pub struct RoundingBottom;

impl PatternRule for RoundingBottom {
    fn name(&self) -> &'static str {
        "원형 바닥형 (Rounding Bottom)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 40 {
            return None;
        }
        let lows: Vec<f64> = bars[bars.len() - 40..].iter().map(|b| b.low).collect();
        let (a, b) = quadratic_fit(&lows)?;
        if a > 0.0 {
            let vertex = -b / (2.0 * a);
            if vertex > 10.0 && vertex < 30.0 {
                let close = last_close(bars);
                let min_low = vmin(&lows);
                if close > min_low && (close - min_low) / min_low > 0.05 {
                    return Some(pattern(
                        self.name(),
                        Signal::Bullish,
                        0.85,
                        "긴 시간 동안 완만하게 저점을 다진 U자 패턴. 안정적이고 강한 상승 추세의 시작점.",
                    ));
                }
            }
        }
        None
    }
}

pub struct RoundingTop;

impl PatternRule for RoundingTop {
    fn name(&self) -> &'static str {
        "원형 천장형 (Rounding Top)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 40 {
            return None;
        }
        let highs: Vec<f64> = bars[bars.len() - 40..].iter().map(|b| b.high).collect();
        let (a, b) = quadratic_fit(&highs)?;
        if a < 0.0 {
            let vertex = -b / (2.0 * a);
            if vertex > 10.0 && vertex < 30.0 {
                let close = last_close(bars);
                let max_high = vmax(&highs);
                if close < max_high && (max_high - close) / max_high > 0.05 {
                    return Some(pattern(
                        self.name(),
                        Signal::Bearish,
                        0.85,
                        "완만한 역 U자 곡선을 그리며 서서히 하락 전환. 매도 압력이 점진적으로 강해지는 중.",
                    ));
                }
            }
        }
        None
    }
}

// ── consolidation breaks ──

pub struct DirectionalTriangle;

impl PatternRule for DirectionalTriangle {
    fn name(&self) -> &'static str {
        "상승/하락 삼각형 (Triangle)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, troughs) = local_extrema(bars, TIGHT_ORDER);
        let p = last_values(&peaks, 3)?;
        let t = last_values(&troughs, 3)?;

        let flat_peaks = (vmax(&p) - vmin(&p)) / vmean(&p) < 0.02;
        let flat_troughs = (vmax(&t) - vmin(&t)) / vmean(&t) < 0.02;
        let close = last_close(bars);

        if flat_peaks && rising(&t) && close >= vmin(&p) * 0.98 {
            return Some(pattern(
                "상승 삼각형 (Ascending Triangle)",
                Signal::Bullish,
                0.85,
                "고점은 유지되지만 저점이 지속적으로 높아짐. 상단 돌파 시 매우 긍정적 기류.",
            ));
        }
        if flat_troughs && falling(&p) && close <= vmax(&t) * 1.02 {
            return Some(pattern(
                "하락 삼각형 (Descending Triangle)",
                Signal::Bearish,
                0.85,
                "저점은 수평이지만 고점은 점점 낮아짐. 하방 이탈 가능성 고조로 각별한 주의 요구.",
            ));
        }
        None
    }
}

pub struct SymmetricalTriangle;

impl PatternRule for SymmetricalTriangle {
    fn name(&self) -> &'static str {
        "대칭 삼각형 (Symmetrical Triangle)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, troughs) = local_extrema(bars, TIGHT_ORDER);
        let p = last_values(&peaks, 3)?;
        let t = last_values(&troughs, 3)?;

        if rising(&t) && falling(&p) {
            let close = last_close(bars);
            if close > p[2] {
                return Some(pattern(
                    "대칭 삼각형 상방 돌파 (Symmetrical Triangle Breakout)",
                    Signal::Bullish,
                    0.82,
                    "힘의 균형을 이루며 수렴하던 삼각 패턴을 상방으로 강하게 뚫어냄. 강력한 매수 에너지 발생.",
                ));
            }
            if close < t[2] {
                return Some(pattern(
                    "대칭 삼각형 하방 이탈 (Symmetrical Triangle Breakdown)",
                    Signal::Bearish,
                    0.82,
                    "힘의 균형이 깨지며 하방으로 이탈함. 단기적/중기적 하락 추세 전조 증상.",
                ));
            }
        }
        None
    }
}

pub struct Rectangle;

impl PatternRule for Rectangle {
    fn name(&self) -> &'static str {
        "박스권 (Rectangle)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, troughs) = local_extrema(bars, TIGHT_ORDER);
        let p = last_values(&peaks, 3)?;
        let t = last_values(&troughs, 3)?;

        let flat_peaks = (vmax(&p) - vmin(&p)) / vmean(&p) < 0.02;
        let flat_troughs = (vmax(&t) - vmin(&t)) / vmean(&t) < 0.02;
        if flat_peaks && flat_troughs {
            let close = last_close(bars);
            if close > vmax(&p) {
                return Some(pattern(
                    "박스권 상단 돌파 (Rectangle Breakout)",
                    Signal::Bullish,
                    0.85,
                    "긴 횡보장(박스권)의 천장 저항을 폭발적으로 돌파. 에너지가 분출되는 강한 매수 시그널.",
                ));
            }
            if close < vmin(&t) {
                return Some(pattern(
                    "박스권 하단 이탈 (Rectangle Breakdown)",
                    Signal::Bearish,
                    0.85,
                    "박스권 바닥이 무너짐. 매물벽이 두터워지고 추가 급락이 우려되는 매도 포지션.",
                ));
            }
        }
        None
    }
}

pub struct Wedge;

impl PatternRule for Wedge {
    fn name(&self) -> &'static str {
        "쐐기형 (Wedge)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        if bars.len() < 20 {
            return None;
        }
        let (peaks, troughs) = local_extrema(bars, TIGHT_ORDER);
        let p = last_values(&peaks, 3)?;
        let t = last_values(&troughs, 3)?;
        let close = last_close(bars);

        // converging slopes: the narrowing side breaks first
        if falling(&p) && falling(&t) {
            let peak_slope = p[2] - p[0];
            let trough_slope = t[2] - t[0];
            if peak_slope < trough_slope && close > p[2] {
                return Some(pattern(
                    "하락 쐐기형 돌파 (Falling Wedge Breakout)",
                    Signal::Bullish,
                    0.88,
                    "하락 쐐기형의 빗장 저항을 뚫음. 강력한 브레이크아웃형 상승 추세 스타트.",
                ));
            }
        }
        if rising(&p) && rising(&t) {
            let peak_slope = p[2] - p[0];
            let trough_slope = t[2] - t[0];
            if trough_slope > peak_slope && close < t[2] {
                return Some(pattern(
                    "상승 쐐기형 이탈 (Rising Wedge Breakdown)",
                    Signal::Bearish,
                    0.88,
                    "상승 쐐기의 하단 지지선을 깨트림. 매수 에너지가 소진되어 단기 급락 위험 점증.",
                ));
            }
        }
        None
    }
}

pub struct FlagPennant;

impl PatternRule for FlagPennant {
    fn name(&self) -> &'static str {
        "깃발/페넌트형 (Flag/Pennant)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        let n = bars.len();
        if n < 25 {
            return None;
        }
        // pole: a fast move over the 15 bars preceding the flag window
        let pole = &bars[n - 25..n - 10];
        let flag = &bars[n - 10..];

        let pole_high = pole.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let pole_low = pole.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        if (pole_high - pole_low) / pole_low < 0.15 {
            return None;
        }
        let pole_bullish = pole[pole.len() - 1].close > pole[0].open;

        let flag_high = flag.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let flag_low = flag.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        if (flag_high - flag_low) / flag_low >= 0.08 {
            return None;
        }

        let close = last_close(bars);
        if pole_bullish && close > flag_high * 0.98 {
            return Some(pattern(
                "상승 깃발/페넌트형 (Bullish Flag/Pennant)",
                Signal::Bullish,
                0.86,
                "강한 상승 후 짧은 기간의 휴지기(수렴). 응축된 에너지를 바탕으로 2차 급등 가능성 짙음.",
            ));
        }
        if !pole_bullish && close < flag_low * 1.02 {
            return Some(pattern(
                "하락 깃발/페넌트형 (Bearish Flag/Pennant)",
                Signal::Bearish,
                0.86,
                "강한 하락 후 짧은 반등/횡보(수렴). 하방 지지력이 약해 2차 급락 발생 확률 높음.",
            ));
        }
        None
    }
}

// ── retracement entries ──

const FIB_LEVELS: [(&str, f64); 4] = [
    ("38.2% (충동적)", 0.382),
    ("61.8% (골든존)", 0.618),
    ("78.6% (기관)", 0.786),
    ("88.6% (딥)", 0.886),
];
const FIB_TOLERANCE: f64 = 0.04;

pub struct FibonacciRetracement;

impl PatternRule for FibonacciRetracement {
    fn name(&self) -> &'static str {
        "피보나치 되돌림 (Fibonacci)"
    }

    fn evaluate(&self, series: &CandleSeries) -> Option<Pattern> {
        let bars = series.bars();
        let lookback = bars.len().min(60);
        if lookback < 20 {
            return None;
        }
        // swing structure over the wave up to yesterday
        let recent = &bars[bars.len() - lookback..bars.len() - 1];
        let mut min_i = 0;
        let mut max_i = 0;
        for (i, b) in recent.iter().enumerate() {
            if b.low < recent[min_i].low {
                min_i = i;
            }
            if b.high > recent[max_i].high {
                max_i = i;
            }
        }
        if min_i >= max_i {
            return None;
        }
        let swing_low = recent[min_i].low;
        let swing_high = recent[max_i].high;
        let wave_range = swing_high - swing_low;
        if wave_range == 0.0 {
            return None;
        }

        let close = last_close(bars);
        let retracement = (swing_high - close) / wave_range;
        let level = FIB_LEVELS
            .iter()
            .find(|(_, entry)| (retracement - entry).abs() <= FIB_TOLERANCE)
            .map(|(name, _)| *name)?;

        // confluence with the 20-day mean lifts confidence
        let ma20 = {
            let closes = &bars[bars.len() - 20..];
            closes.iter().map(|b| b.close).sum::<f64>() / 20.0
        };
        let confluence = ma20 > 0.0 && (close - ma20).abs() / close <= 0.03;

        let description = format!(
            "강한 상승 파동 이후 피보나치 {} 되돌림 도달.{}",
            level,
            if confluence {
                " 20일 이평선 지지가 맞물려(Confluence) 신뢰도가 매우 높습니다."
            } else {
                " 이동평균선과 다소 이격이 있어 1차 분할 매수만 권장합니다."
            }
        );
        Some(pattern(
            self.name(),
            Signal::Bullish,
            if confluence { 0.85 } else { 0.65 },
            &description,
        ))
    }
}

/// Relaxed-threshold scan for structures that are still forming. Consulted
/// only when no confirmed rule fired, so the report never goes out empty
/// while a near-complete reversal is on the chart.
pub fn near_miss(series: &CandleSeries) -> Option<Pattern> {
    let bars = series.bars();
    if bars.len() < 20 {
        return None;
    }
    let (peaks, troughs) = local_extrema(bars, SWING_ORDER);
    let close = last_close(bars);

    if let Some(v) = last_values(&troughs, 2) {
        if (v[0] - v[1]).abs() / v[0].max(v[1]) < 0.08 && close > v[1] * 0.97 {
            return Some(pattern(
                "잠재적 이중 바닥형 (Double Bottom 가능성)",
                Signal::Bullish,
                0.45,
                "현재 뚜렷한 확정 패턴은 없으나, [이중 바닥형(쌍바닥)] 패턴이 형성될 가능성이 관측되고 있습니다. 지지선 이탈 여부를 주의 깊게 관찰하세요.",
            ));
        }
    }
    if let Some(v) = last_values(&peaks, 2) {
        if (v[0] - v[1]).abs() / v[0].max(v[1]) < 0.08 && close < v[1] * 1.03 {
            return Some(pattern(
                "잠재적 이중 천장형 (Double Top 가능성)",
                Signal::Bearish,
                0.45,
                "현재 뚜렷한 확정 패턴은 없으나, [이중 천장형(쌍봉)] 패턴이 형성될 가능성이 관측되고 있습니다. 단기 고점 저항 돌파 여부 확인이 필요합니다.",
            ));
        }
    }
    if let Some(v) = last_values(&peaks, 3) {
        if v[1] > v[0] && v[1] > v[2] && (v[0] - v[2]).abs() / v[0].max(v[2]) < 0.12 && close < v[2] * 1.04 {
            return Some(pattern(
                "잠재적 헤드 앤 숄더 (H&S 가능성)",
                Signal::Bearish,
                0.45,
                "현재 뚜렷한 확정 패턴은 없으나, 강력한 하단 압력 시그널인 [헤드 앤 숄더] 패턴이 형성될 조짐이 보입니다. 각별한 리스크 관리가 요구됩니다.",
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternDetector;
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

    /// W-shaped series: troughs at 100 and 100.5 with a recovery close.
    fn w_shaped_series() -> CandleSeries {
        let lows = [
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 106.0,
            104.0, 102.0, 100.5, 102.0, 104.0, 106.0, 108.0,
        ];
        let mut bars: Vec<Candle> = lows
            .iter()
            .enumerate()
            .map(|(i, &low)| bar(i as u64, low + 1.5, low + 4.0, low, low + 2.5))
            .collect();
        bars.push(bar(19, 104.0, 107.0, 103.0, 105.0));
        CandleSeries::new(bars)
    }

    #[test]
    fn double_bottom_fires_on_w_shape() {
        let detection = PatternDetector::new().detect(&w_shaped_series());

        assert!(!detection.patterns.is_empty());
        let double_bottom = detection
            .patterns
            .iter()
            .find(|p| p.name.contains("이중 바닥형"))
            .expect("double bottom should fire");
        assert_eq!(double_bottom.signal, Signal::Bullish);
        assert!((double_bottom.confidence - 0.85).abs() < 1e-9);
        // the relaxed scan must stay out once a confirmed rule fired
        assert!(detection.patterns.iter().all(|p| !p.name.contains("잠재적")));
    }

    #[test]
    fn head_and_shoulders_fires_below_right_shoulder() {
        let highs = [
            100.0, 102.0, 104.0, 107.0, 110.0, 107.0, 104.0, 108.0, 112.0, 116.0, 120.0, 116.0,
            112.0, 108.0, 108.0, 109.0, 111.0, 108.0, 105.0,
        ];
        let mut bars: Vec<Candle> = highs
            .iter()
            .enumerate()
            .map(|(i, &high)| bar(i as u64, high - 3.0, high, high - 4.0, high - 1.0))
            .collect();
        bars.push(bar(19, 101.0, 103.0, 99.0, 103.0));
        let detection = PatternDetector::new().detect(&CandleSeries::new(bars));

        let hns = detection
            .patterns
            .iter()
            .find(|p| p.name.contains("헤드 앤 숄더"))
            .expect("head and shoulders should fire");
        assert_eq!(hns.signal, Signal::Bearish);
        assert!((hns.confidence - 0.90).abs() < 1e-9);
    }

    #[test]
    fn forming_double_bottom_reported_when_nothing_confirmed() {
        // troughs 5% apart: too loose for the confirmed rule, close enough
        // for the relaxed scan
        let lows = [
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 109.0,
            108.0, 106.0, 105.0, 106.0, 108.0, 109.0, 110.0, 110.0,
        ];
        let bars: Vec<Candle> = lows
            .iter()
            .enumerate()
            .map(|(i, &low)| bar(i as u64, low + 1.5, low + 4.0, low, low + 2.5))
            .collect();
        let detection = PatternDetector::new().detect(&CandleSeries::new(bars));

        assert_eq!(detection.patterns.len(), 1);
        let forming = &detection.patterns[0];
        assert!(forming.name.contains("잠재적 이중 바닥형"));
        assert_eq!(forming.signal, Signal::Bullish);
        assert!((forming.confidence - 0.45).abs() < 1e-9);
    }

    #[test]
    fn monotonic_series_has_no_swing_patterns() {
        let bars: Vec<Candle> = (0..40)
            .map(|i| {
                let close = 100.0 + i as f64;
                bar(i, close - 0.5, close + 1.0, close - 1.5, close)
            })
            .collect();
        let detection = PatternDetector::new().detect(&CandleSeries::new(bars));
        assert!(detection.patterns.is_empty());
    }

    #[test]
    fn extrema_pick_out_swing_points() {
        let series = w_shaped_series();
        let (peaks, troughs) = local_extrema(series.bars(), SWING_ORDER);

        assert_eq!(troughs.iter().map(|t| t.0).collect::<Vec<_>>(), vec![5, 14]);
        assert!((troughs[0].1 - 100.0).abs() < 1e-9);
        assert!(peaks.iter().any(|p| p.0 == 10));
    }
}
