use market_core::{BuyReport, CandleSeries, Pattern, SellReport, Signal, Trend, TrendAssessment};

/// Trailing window over which support/resistance levels are taken.
pub const ANALYSIS_WINDOW: usize = 20;
/// Weakest pattern confidence that can anchor a trade report.
pub const MIN_PATTERN_CONFIDENCE: f64 = 0.5;

/// Buffer and headroom sized as fractions of the window range.
const STOP_BUFFER: f64 = 0.02;
const TARGET_HEADROOM: f64 = 0.02;

const ENTRY_TIP: &str = "뚜렷한 패턴 부재 시, 이전 저점 부근에서의 지지 여부를 최우선으로 확인하세요.";
const EXIT_TIP: &str = "강한 하락 패턴이 없다면 이전 고점 돌파 여부를 지켜보며 분할 매도를 고려하세요.";

struct Levels {
    close: f64,
    support: f64,
    resistance: f64,
    range: f64,
}

fn window_levels(series: &CandleSeries) -> Option<Levels> {
    let bars = series.tail(ANALYSIS_WINDOW);
    let close = bars.last()?.close;
    let support = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let resistance = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    Some(Levels {
        close,
        support,
        resistance,
        range: resistance - support,
    })
}

fn best_pattern(patterns: &[Pattern], signal: Signal) -> Option<&Pattern> {
    patterns
        .iter()
        .filter(|p| p.signal == signal)
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Buy report: only for a bullish trend anchored by a sufficiently strong
/// bullish pattern, and only when the resulting risk:reward is positive and
/// finite. Otherwise absent rather than zero-filled.
pub fn compose_buy_report(
    series: &CandleSeries,
    patterns: &[Pattern],
    trend: &TrendAssessment,
    volume_note: &str,
) -> Option<BuyReport> {
    if trend.trend != Trend::Bullish {
        return None;
    }
    let best = best_pattern(patterns, Signal::Bullish)?;
    if best.confidence < MIN_PATTERN_CONFIDENCE {
        return None;
    }
    let levels = window_levels(series)?;

    let aggressive_entry = levels.close;
    let conservative_entry = (levels.close + levels.support) / 2.0;
    let stop_loss = levels.support - levels.range * STOP_BUFFER;
    let target_price = levels.resistance + levels.range * TARGET_HEADROOM * best.confidence;

    let risk_reward = (target_price - aggressive_entry) / (aggressive_entry - stop_loss);
    if !risk_reward.is_finite() || risk_reward <= 0.0 {
        tracing::debug!(rr = risk_reward, "buy report dropped on risk:reward check");
        return None;
    }

    Some(BuyReport {
        signal_strength: (best.confidence * 100.0).round() as u8,
        primary_pattern: best.name.clone(),
        primary_pattern_desc: best.description.clone(),
        aggressive_entry: round2(aggressive_entry),
        conservative_entry: round2(conservative_entry),
        stop_loss: round2(stop_loss),
        target_price: round2(target_price),
        risk_reward: round2(risk_reward),
        volume_note: volume_note.to_string(),
        entry_tip: ENTRY_TIP.to_string(),
    })
}

/// Sell mirror of the buy composition: bearish trend, strongest bearish
/// pattern, levels flipped around resistance.
pub fn compose_sell_report(
    series: &CandleSeries,
    patterns: &[Pattern],
    trend: &TrendAssessment,
    volume_note: &str,
) -> Option<SellReport> {
    if trend.trend != Trend::Bearish {
        return None;
    }
    let best = best_pattern(patterns, Signal::Bearish)?;
    if best.confidence < MIN_PATTERN_CONFIDENCE {
        return None;
    }
    let levels = window_levels(series)?;

    let sell_price = levels.close;
    let conservative_sell = (levels.close + levels.resistance) / 2.0;
    let stop_loss = levels.resistance + levels.range * STOP_BUFFER;
    let target_price = levels.support - levels.range * TARGET_HEADROOM * best.confidence;

    let risk_reward = (sell_price - target_price) / (stop_loss - sell_price);
    if !risk_reward.is_finite() || risk_reward <= 0.0 {
        tracing::debug!(rr = risk_reward, "sell report dropped on risk:reward check");
        return None;
    }

    Some(SellReport {
        signal_strength: (best.confidence * 100.0).round() as u8,
        primary_pattern: best.name.clone(),
        primary_pattern_desc: best.description.clone(),
        sell_price: round2(sell_price),
        conservative_sell: round2(conservative_sell),
        stop_loss: round2(stop_loss),
        target_price: round2(target_price),
        risk_reward: round2(risk_reward),
        volume_note: volume_note.to_string(),
        exit_tip: EXIT_TIP.to_string(),
    })
}
