mod industry;
mod profile;
mod translate;

use market_core::{Enrichment, Ticker};
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;

pub const DEFAULT_INDUSTRY: &str = "분류되지 않음";
pub const DEFAULT_SUMMARY: &str = "기업 상세 정보를 불러오는 중 오류가 발생했습니다.";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Company metadata coordinator. Every lookup is best-effort with a fixed
/// default on failure or timeout, so `enrich` cannot fail a request.
#[derive(Clone)]
pub struct Enricher {
    client: Client,
    lookup_timeout: Duration,
}

impl Enricher {
    pub fn new() -> Self {
        Self::with_timeout(LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(lookup_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            lookup_timeout,
        }
    }

    /// Gather industry classification and a translated company description.
    /// The Naver scrape runs concurrently with the profile+translation
    /// pipeline; the provider's English industry tag only fills in when the
    /// scrape came up empty.
    pub async fn enrich(&self, ticker: &Ticker) -> Enrichment {
        let industry_task = timeout(
            self.lookup_timeout,
            industry::fetch_industry(&self.client, &ticker.code),
        );
        let description_task = self.describe(ticker.symbol());

        let (industry_result, (description, fallback_industry)) =
            tokio::join!(industry_task, description_task);

        let industry = industry_result
            .ok()
            .flatten()
            .or(fallback_industry)
            .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string());
        let description = description.unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

        Enrichment {
            company_summary: compose_summary(&industry, &description),
            industry,
        }
    }

    /// Profile fetch then translation, each under its own timeout. Returns
    /// the Korean description and a translated industry fallback; untranslated
    /// English text is never used.
    async fn describe(&self, symbol: String) -> (Option<String>, Option<String>) {
        let profile = match timeout(
            self.lookup_timeout,
            profile::fetch_profile(&self.client, &symbol),
        )
        .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::debug!(symbol = %symbol, "company profile unavailable");
                return (None, None);
            }
            Err(_) => {
                tracing::debug!(symbol = %symbol, "company profile lookup timed out");
                return (None, None);
            }
        };

        let description = match &profile.summary {
            Some(text) => timeout(
                self.lookup_timeout,
                translate::translate_en_ko(&self.client, text),
            )
            .await
            .ok()
            .flatten(),
            None => None,
        };

        let fallback_industry = match &profile.industry {
            Some(tag) => timeout(
                self.lookup_timeout,
                translate::translate_en_ko(&self.client, tag),
            )
            .await
            .ok()
            .flatten(),
            None => None,
        };

        (description, fallback_industry)
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new()
    }
}

fn compose_summary(industry: &str, description: &str) -> String {
    format!(
        "\"글로벌 경쟁력 기반의 {} 선도 기업\"\n\n{}",
        industry, description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::Market;

    #[test]
    fn summary_carries_industry_headline_and_description() {
        let summary = compose_summary("반도체와반도체장비", "메모리 반도체를 생산합니다.");
        assert!(summary.contains("반도체와반도체장비"));
        assert!(summary.contains("메모리 반도체를 생산합니다."));
    }

    #[tokio::test]
    async fn enrich_degrades_to_defaults_when_everything_times_out() {
        let enricher = Enricher::with_timeout(Duration::from_millis(1));
        let enriched = enricher
            .enrich(&Ticker::new("005930", Market::Kospi))
            .await;

        assert_eq!(enriched.industry, DEFAULT_INDUSTRY);
        assert!(enriched.company_summary.contains(DEFAULT_SUMMARY));
        assert!(enriched.company_summary.contains(DEFAULT_INDUSTRY));
    }
}
