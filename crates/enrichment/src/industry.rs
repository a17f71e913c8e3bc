use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;

const BASE_URL: &str = "https://finance.naver.com/item/main.naver";

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<h4 class="h_sub sub_tit7">.*?<a[^>]*>(.*?)</a>"#)
            .unwrap_or_else(|e| panic!("industry heading regex: {e}"))
    })
}

/// Scrape the WICS industry heading from the Naver Finance company page.
/// The page is EUC-KR; reqwest decodes it from the charset header.
pub(crate) async fn fetch_industry(client: &Client, code: &str) -> Option<String> {
    let html = client
        .get(BASE_URL)
        .query(&[("code", code)])
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .text()
        .await
        .ok()?;

    extract_industry(&html)
}

pub(crate) fn extract_industry(html: &str) -> Option<String> {
    let captured = heading_re().captures(html)?.get(1)?.as_str();
    let industry = captured.replace("동일업종비교", "").trim().to_string();

    // Drop mojibake from a bad charset round-trip
    if industry.is_empty() || industry.chars().any(|c| c >= '\u{FFFD}') {
        return None;
    }
    Some(industry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_heading_across_lines() {
        let html = "<h4 class=\"h_sub sub_tit7\">\n<em></em>\n<a href=\"/sise\">반도체와반도체장비 동일업종비교</a></h4>";
        assert_eq!(extract_industry(html).unwrap(), "반도체와반도체장비");
    }

    #[test]
    fn rejects_missing_heading_and_mojibake() {
        assert!(extract_industry("<h4>other</h4>").is_none());
        let bad = "<h4 class=\"h_sub sub_tit7\"><a>\u{FFFD}\u{FFFD}</a>";
        assert!(extract_industry(bad).is_none());
    }
}
