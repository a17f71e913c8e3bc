use market_core::{IndicatorSet, Pattern, Signal, Trend, TrendAssessment};

const ORDERING_WEIGHT: f64 = 0.6;
const PATTERN_WEIGHT: f64 = 0.4;
const BULLISH_THRESHOLD: u8 = 60;
const BEARISH_THRESHOLD: u8 = 40;

const LABEL_BULLISH: &str = "상승세 (저항선 부근 분할 매도로 수익 실현 고려)";
const LABEL_BEARISH: &str = "하락세 (섣부른 물타기 금지, 지지선 반등 확인 후 접근)";
const LABEL_NEUTRAL: &str = "중립 (방향성 탐색 중, 관망 권고)";
const LABEL_NO_PATTERN: &str = "중립 (패턴 미감지)";

/// MA stack ordering score in [-1, 1]: each adjacent pair of available MAs
/// (shortest window first) counts +1 when the shorter sits above the longer.
fn ordering_score(indicators: &IndicatorSet) -> Option<f64> {
    let mas = indicators.available();
    if mas.len() < 2 {
        return None;
    }

    let mut score = 0i32;
    for pair in mas.windows(2) {
        if pair[0] > pair[1] {
            score += 1;
        } else if pair[0] < pair[1] {
            score -= 1;
        }
    }
    Some(score as f64 / (mas.len() - 1) as f64)
}

/// Net pattern sentiment in [-1, 1]: bullish minus bearish confidence,
/// normalized by the total. No patterns reads as flat.
fn pattern_score(patterns: &[Pattern]) -> f64 {
    let bullish: f64 = patterns
        .iter()
        .filter(|p| p.signal == Signal::Bullish)
        .map(|p| p.confidence)
        .sum();
    let bearish: f64 = patterns
        .iter()
        .filter(|p| p.signal == Signal::Bearish)
        .map(|p| p.confidence)
        .sum();
    let total = bullish + bearish;
    if total == 0.0 {
        0.0
    } else {
        (bullish - bearish) / total
    }
}

/// Blend MA structure with pattern sentiment into a labeled trend. The MA
/// ordering carries more weight since it is the more stable signal; fewer
/// than two available MAs defaults to neutral at strength 50.
pub fn classify_trend(indicators: &IndicatorSet, patterns: &[Pattern]) -> TrendAssessment {
    let Some(ordering) = ordering_score(indicators) else {
        return TrendAssessment {
            trend: Trend::Neutral,
            label: LABEL_NEUTRAL.to_string(),
            strength: 50,
        };
    };

    let blend = ORDERING_WEIGHT * ordering + PATTERN_WEIGHT * pattern_score(patterns);
    let strength = (50.0 + 50.0 * blend).round().clamp(0.0, 100.0) as u8;

    let (trend, label) = if strength >= BULLISH_THRESHOLD {
        (Trend::Bullish, LABEL_BULLISH)
    } else if strength <= BEARISH_THRESHOLD {
        (Trend::Bearish, LABEL_BEARISH)
    } else if patterns.is_empty() {
        (Trend::Neutral, LABEL_NO_PATTERN)
    } else {
        (Trend::Neutral, LABEL_NEUTRAL)
    };

    TrendAssessment {
        trend,
        label: label.to_string(),
        strength,
    }
}
