#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use market_core::{Candle, CandleSeries};

    // Helper to build a series from closes only
    fn series_from_closes(closes: &[f64]) -> CandleSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i as u64))
                    .unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        CandleSeries::new(bars)
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_rolling_sma_alignment() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = rolling_sma(&data, 3);

        assert_eq!(result.len(), 5);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_ma5_on_six_bars() {
        let series = series_from_closes(&[100.0, 102.0, 101.0, 105.0, 107.0, 110.0]);
        let set = compute_indicators(&series);

        // mean(102, 101, 105, 107, 110) = 105.0
        assert!((set.ma5.unwrap() - 105.0).abs() < 0.001);
        assert_eq!(set.ma10, None);
        assert_eq!(set.ma20, None);
        assert_eq!(set.ma120, None);
    }

    #[test]
    fn test_daily_change_rounding() {
        let series = series_from_closes(&[100.0, 102.0, 101.0, 105.0, 107.0, 110.0]);
        let (change, change_pct) = daily_change(&series).unwrap();

        assert!((change - 3.0).abs() < 0.001);
        assert!((change_pct - 2.8).abs() < 0.001); // 3/107*100 = 2.8037 -> 2.80
    }

    #[test]
    fn test_daily_change_single_bar() {
        let series = series_from_closes(&[100.0]);
        assert_eq!(daily_change(&series).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_daily_change_zero_prev_close() {
        let series = series_from_closes(&[0.0, 100.0]);
        assert!(daily_change(&series).is_err());
    }
}
