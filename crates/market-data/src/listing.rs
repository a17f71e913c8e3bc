use market_core::{Market, StockEntry};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

const BASE_URL: &str = "https://m.stock.naver.com/api/stocks/marketValue";
const MAX_RESULTS: usize = 20;

/// Full KOSPI + KOSDAQ roster for the suggest endpoint. Loaded once in the
/// background at startup; serves the built-in list until (or instead of)
/// the remote load completing.
pub struct StockListing {
    entries: RwLock<Vec<StockEntry>>,
    client: Client,
}

fn builtin_roster() -> Vec<StockEntry> {
    let seed: [(&str, &str, Market); 14] = [
        ("삼성전자", "005930", Market::Kospi),
        ("SK하이닉스", "000660", Market::Kospi),
        ("LG에너지솔루션", "373220", Market::Kospi),
        ("삼성바이오로직스", "207940", Market::Kospi),
        ("현대차", "005380", Market::Kospi),
        ("기아", "000270", Market::Kospi),
        ("셀트리온", "068270", Market::Kospi),
        ("NAVER", "035420", Market::Kospi),
        ("카카오", "035720", Market::Kospi),
        ("에코프로", "086520", Market::Kosdaq),
        ("알테오젠", "196170", Market::Kosdaq),
        ("HLB", "028300", Market::Kosdaq),
        ("에코프로비엠", "247540", Market::Kosdaq),
        ("삼천당제약", "000250", Market::Kosdaq),
    ];
    seed.into_iter()
        .map(|(name, code, market)| StockEntry {
            name: name.to_string(),
            code: code.to_string(),
            market,
        })
        .collect()
}

impl StockListing {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(crate::USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            entries: RwLock::new(builtin_roster()),
            client,
        }
    }

    #[cfg(test)]
    fn with_entries(entries: Vec<StockEntry>) -> Self {
        let listing = Self::new();
        listing.replace(entries);
        listing
    }

    fn replace(&self, entries: Vec<StockEntry>) {
        if let Ok(mut guard) = self.entries.write() {
            *guard = entries;
        }
    }

    /// Load the full roster from the paged market-value API. On any failure
    /// the built-in list stays in place.
    pub async fn load(&self) {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for market in [Market::Kospi, Market::Kosdaq] {
            let mut page = 1u32;
            loop {
                match self.fetch_page(market, page).await {
                    Ok(items) if !items.is_empty() => {
                        for entry in items {
                            if seen.insert(entry.code.clone()) {
                                entries.push(entry);
                            }
                        }
                        page += 1;
                    }
                    Ok(_) => break,
                    Err(e) => {
                        tracing::warn!(market = market.as_str(), page, error = %e, "roster load failed, keeping built-in list");
                        return;
                    }
                }
            }
        }

        if entries.is_empty() {
            tracing::warn!("roster load returned no entries, keeping built-in list");
            return;
        }

        tracing::info!(count = entries.len(), "stock roster loaded");
        self.replace(entries);
    }

    async fn fetch_page(
        &self,
        market: Market,
        page: u32,
    ) -> Result<Vec<StockEntry>, reqwest::Error> {
        let url = format!(
            "{}/{}?page={}&pageSize=100",
            BASE_URL,
            market.as_str(),
            page
        );
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = body
            .get("stocks")
            .and_then(Value::as_array)
            .map(|stocks| {
                stocks
                    .iter()
                    .filter_map(|item| {
                        let code = item.get("itemCode")?.as_str()?;
                        let name = item.get("stockName")?.as_str()?;
                        if code.is_empty() || name.is_empty() {
                            return None;
                        }
                        Some(StockEntry {
                            name: name.to_string(),
                            code: code.to_string(),
                            market,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(items)
    }

    /// Ranked search: exact code match first, then name-prefix matches,
    /// then substring matches on name or code. Capped at 20 results.
    pub fn search(&self, query: &str) -> Vec<StockEntry> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let query_upper = query.to_uppercase();

        let mut results: Vec<StockEntry> = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |entry: &StockEntry, results: &mut Vec<StockEntry>| -> bool {
            if seen.insert(entry.code.clone()) {
                results.push(entry.clone());
            }
            results.len() >= MAX_RESULTS
        };

        if let Some(exact) = entries.iter().find(|e| e.code == query) {
            push(exact, &mut results);
        }

        for entry in entries.iter() {
            if entry.name.to_uppercase().starts_with(&query_upper)
                && push(entry, &mut results)
            {
                return results;
            }
        }

        for entry in entries.iter() {
            if (entry.name.to_uppercase().contains(&query_upper) || entry.code.contains(query))
                && push(entry, &mut results)
            {
                break;
            }
        }

        results
    }
}

impl Default for StockListing {
    fn default() -> Self {
        Self::new()
    }
}
