use market_core::NxtQuote;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://polling.finance.naver.com/api/realtime/domestic/stock";

/// After-hours (NXT) session lookup via the Naver polling API. Best-effort:
/// any failure means "no after-hours data", never an error.
#[derive(Clone)]
pub struct NxtClient {
    client: Client,
}

impl NxtClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(crate::USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    pub async fn fetch(&self, code: &str) -> Option<NxtQuote> {
        match self.fetch_inner(code).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::debug!(code, error = %e, "NXT lookup failed");
                None
            }
        }
    }

    async fn fetch_inner(&self, code: &str) -> Result<Option<NxtQuote>, reqwest::Error> {
        let url = format!("{}/{}", BASE_URL, code);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(item) = body.pointer("/datas/0") else {
            return Ok(None);
        };

        Ok(parse_over_market(item))
    }
}

impl Default for NxtClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbers in the polling payload are comma-grouped strings.
fn parse_num(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::String(s)) => s.replace(',', "").parse().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_over_market(item: &Value) -> Option<NxtQuote> {
    let over = item.get("overMarketPriceInfo")?;
    if over.is_null() {
        return None;
    }

    let status = over
        .get("overMarketStatus")
        .and_then(Value::as_str)
        .unwrap_or("CLOSE")
        .to_string();
    let price = parse_num(over.get("overPrice"));
    let mut change = parse_num(over.get("compareToPreviousClosePrice"));
    let mut change_pct = parse_num(over.get("fluctuationsRatio"));

    // The payload reports magnitudes; the direction carries the sign.
    let direction = over
        .pointer("/compareToPreviousPrice/name")
        .and_then(Value::as_str)
        .unwrap_or("");
    if direction == "FALLING" {
        change = -change.abs();
        change_pct = -change_pct.abs();
    }

    Some(NxtQuote {
        nxt_available: true,
        nxt_status: status,
        nxt_time: over
            .get("localTradedAt")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        nxt_price: price,
        nxt_change: change,
        nxt_change_pct: change_pct,
        nxt_high: parse_num(over.get("highPrice")),
        nxt_low: parse_num(over.get("lowPrice")),
        nxt_volume: parse_num(over.get("accumulatedTradingVolume")),
    })
}
