use market_core::{Candle, CandleSeries, Market, MarketError, SeriesSource, Ticker};
use orchestrator::Orchestrator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct MockSource {
    name: &'static str,
    bars: Vec<Candle>,
    calls: AtomicUsize,
    requested_symbols: std::sync::Mutex<Vec<String>>,
}

impl MockSource {
    fn new(name: &'static str, bars: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            name,
            bars,
            calls: AtomicUsize::new(0),
            requested_symbols: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn empty(name: &'static str) -> Arc<Self> {
        Self::new(name, Vec::new())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SeriesSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_series(&self, ticker: &Ticker) -> Result<CandleSeries, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested_symbols
            .lock()
            .unwrap()
            .push(ticker.symbol());
        Ok(CandleSeries::new(self.bars.clone()))
    }
}

fn daily_bars(n: u64) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i))
                    .unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.5,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[tokio::test]
async fn repeated_quote_lookups_hit_upstream_once() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );
    let ticker = Ticker::new("005930", Market::Kospi);

    let first = orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();
    let second = orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();

    assert_eq!(first.price, second.price);
    assert_eq!(first.change, 1.0);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn expired_entry_refetches() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_millis(20),
    );
    let ticker = Ticker::new("005930", Market::Kospi);

    orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();

    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn concurrent_quote_lookups_single_flight() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Arc::new(Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            let ticker = Ticker::new("005930", Market::Kospi);
            orchestrator.get_quote(&ticker, "삼성전자").await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn distinct_tickers_fetch_independently() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );

    orchestrator
        .get_quote(&Ticker::new("005930", Market::Kospi), "삼성전자")
        .await
        .unwrap();
    orchestrator
        .get_quote(&Ticker::new("000660", Market::Kospi), "SK하이닉스")
        .await
        .unwrap();

    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn fallback_receives_suffixed_symbol_then_reports_unavailable() {
    let primary = MockSource::empty("primary");
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );
    let ticker = Ticker::new("247540", Market::Kosdaq);

    let err = orchestrator
        .get_quote(&ticker, "에코프로비엠")
        .await
        .unwrap_err();

    assert!(matches!(err, MarketError::UpstreamUnavailable(code) if code == "247540"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
    let symbols = fallback.requested_symbols.lock().unwrap();
    assert_eq!(symbols.as_slice(), ["247540.KQ"]);

    // the failure must not be cached
    drop(symbols);
    let _ = orchestrator.get_quote(&ticker, "에코프로비엠").await;
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn quote_carries_indicators_and_no_nxt_without_session_data() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );
    let ticker = Ticker::new("005930", Market::Kospi);

    let quote = orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();

    assert_eq!(quote.price, 129.0);
    assert!(quote.ma5.is_some());
    assert!(quote.ma20.is_some());
    assert!(quote.ma60.is_none()); // only 30 bars
    assert!(quote.nxt.is_none());

    let json = serde_json::to_value(&quote).unwrap();
    assert!(json.get("nxt").is_none());
    assert_eq!(json["market"], "KOSPI");
}

#[tokio::test]
async fn analysis_report_is_assembled_from_the_series() {
    let primary = MockSource::new("primary", daily_bars(80));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );
    let ticker = Ticker::new("005930", Market::Kospi);

    let report = orchestrator.get_analysis(&ticker, "삼성전자").await.unwrap();

    assert_eq!(report.code, "005930");
    assert_eq!(report.recent_candles.len(), 60);
    assert_eq!(report.recent_week_analysis.len(), 5);
    assert!(report.trend_strength <= 100);
    if let Some(buy) = &report.buy_report {
        assert!(buy.risk_reward > 0.0);
    }
}

#[tokio::test]
async fn analysis_is_not_served_from_the_quote_cache() {
    let primary = MockSource::new("primary", daily_bars(30));
    let fallback = MockSource::empty("fallback");
    let orchestrator = Orchestrator::with_sources(
        primary.clone(),
        fallback.clone(),
        Duration::from_secs(300),
    );
    let ticker = Ticker::new("005930", Market::Kospi);

    orchestrator.get_quote(&ticker, "삼성전자").await.unwrap();
    orchestrator.get_analysis(&ticker, "삼성전자").await.unwrap();

    assert_eq!(primary.calls(), 2);
}
