use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MAX_SUMMARY_CHARS: usize = 2000;

pub(crate) struct CompanyProfile {
    /// English long-form business description, truncated for translation.
    pub summary: Option<String>,
    /// Provider's English industry tag, used only as a classification
    /// fallback.
    pub industry: Option<String>,
}

pub(crate) async fn fetch_profile(client: &Client, symbol: &str) -> Option<CompanyProfile> {
    let url = format!("{}/{}", BASE_URL, symbol);
    let body: Value = client
        .get(&url)
        .query(&[("modules", "assetProfile")])
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .json()
        .await
        .ok()?;

    let profile = body.pointer("/quoteSummary/result/0/assetProfile")?;
    let summary = profile
        .get("longBusinessSummary")
        .and_then(Value::as_str)
        .map(truncate_chars);
    let industry = profile
        .get("industry")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(CompanyProfile { summary, industry })
}

fn truncate_chars(text: &str) -> String {
    text.chars().take(MAX_SUMMARY_CHARS).collect()
}
