use candle_analysis::{analyze, compute_indicators, daily_change};
use enrichment::{Enricher, DEFAULT_INDUSTRY, DEFAULT_SUMMARY};
use market_core::{AnalysisReport, MarketError, Quote, SeriesSource, Ticker};
use market_data::{fetch_with_fallback, DataGoClient, NxtClient, YahooClient};
use quote_cache::{QuoteCache, DEFAULT_TTL};
use std::sync::Arc;
use std::time::Duration;

/// Owns the source clients, the quote cache, and the enrichment side
/// lookups. One instance is shared across all requests.
pub struct Orchestrator {
    primary: Arc<dyn SeriesSource>,
    fallback: Arc<dyn SeriesSource>,
    nxt: Option<NxtClient>,
    enricher: Option<Enricher>,
    cache: QuoteCache<Ticker, Quote>,
}

impl Orchestrator {
    pub fn new(data_go_api_key: Option<String>) -> Self {
        Self {
            primary: Arc::new(DataGoClient::new(data_go_api_key)),
            fallback: Arc::new(YahooClient::new()),
            nxt: Some(NxtClient::new()),
            enricher: Some(Enricher::new()),
            cache: QuoteCache::new(DEFAULT_TTL),
        }
    }

    /// Pipeline with injected sources and no side lookups. Used by tests.
    pub fn with_sources(
        primary: Arc<dyn SeriesSource>,
        fallback: Arc<dyn SeriesSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            nxt: None,
            enricher: None,
            cache: QuoteCache::new(ttl),
        }
    }

    /// Cached quote lookup. Concurrent misses for the same ticker collapse
    /// into one upstream fetch; failures are never cached.
    pub async fn get_quote(&self, ticker: &Ticker, name: &str) -> Result<Quote, MarketError> {
        self.cache
            .get_or_compute(ticker, || self.build_quote(ticker, name))
            .await
    }

    async fn build_quote(&self, ticker: &Ticker, name: &str) -> Result<Quote, MarketError> {
        let series =
            fetch_with_fallback(self.primary.as_ref(), self.fallback.as_ref(), ticker).await?;

        let (change, change_pct) = daily_change(&series)?;
        let indicators = compute_indicators(&series);
        let latest = series
            .latest()
            .ok_or_else(|| MarketError::InvalidSeries("empty series".into()))?;

        let (nxt, enriched) = tokio::join!(
            async {
                match &self.nxt {
                    Some(client) => client.fetch(&ticker.code).await,
                    None => None,
                }
            },
            async {
                match &self.enricher {
                    Some(enricher) => Some(enricher.enrich(ticker).await),
                    None => None,
                }
            }
        );

        let (industry, company_summary) = match enriched {
            Some(e) => (e.industry, e.company_summary),
            None => (DEFAULT_INDUSTRY.to_string(), DEFAULT_SUMMARY.to_string()),
        };

        Ok(Quote {
            code: ticker.code.clone(),
            market: ticker.market,
            name: name.to_string(),
            date: latest.date.format("%Y-%m-%d").to_string(),
            price: latest.close,
            change,
            change_pct,
            open: latest.open,
            high: latest.high,
            low: latest.low,
            volume: latest.volume,
            ma5: indicators.ma5,
            ma10: indicators.ma10,
            ma20: indicators.ma20,
            ma60: indicators.ma60,
            industry,
            company_summary,
            nxt,
        })
    }

    /// Uncached analysis path: the derived report is cheap relative to the
    /// fetch and callers expect fresh pattern state.
    pub async fn get_analysis(
        &self,
        ticker: &Ticker,
        name: &str,
    ) -> Result<AnalysisReport, MarketError> {
        let series =
            fetch_with_fallback(self.primary.as_ref(), self.fallback.as_ref(), ticker).await?;
        let analysis = analyze(&series);
        tracing::debug!(
            code = %ticker.code,
            patterns = analysis.patterns.len(),
            strength = analysis.trend.strength,
            "analysis computed"
        );

        Ok(AnalysisReport {
            code: ticker.code.clone(),
            market: ticker.market,
            name: name.to_string(),
            trend: analysis.trend.trend,
            trend_label: analysis.trend.label,
            trend_strength: analysis.trend.strength,
            patterns: analysis.patterns,
            recent_candles: analysis.recent_candles,
            recent_week_analysis: analysis.recent_week_analysis,
            volume_note: analysis.volume_note,
            buy_report: analysis.buy_report,
            sell_report: analysis.sell_report,
        })
    }
}
