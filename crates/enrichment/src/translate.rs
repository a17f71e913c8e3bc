use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// English → Korean via the public translate endpoint. The payload is a
/// nested array of sentence segments which are concatenated back together.
pub(crate) async fn translate_en_ko(client: &Client, text: &str) -> Option<String> {
    let body: Value = client
        .get(BASE_URL)
        .query(&[
            ("client", "gtx"),
            ("sl", "en"),
            ("tl", "ko"),
            ("dt", "t"),
            ("q", text),
        ])
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .json()
        .await
        .ok()?;

    let translated = join_segments(&body);
    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}

pub(crate) fn join_segments(body: &Value) -> String {
    body.get(0)
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(|seg| seg.get(0)?.as_str())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_sentence_segments_in_order() {
        let body = serde_json::json!([
            [
                ["삼성전자는 ", "Samsung Electronics ", null],
                ["메모리를 만듭니다.", "makes memory.", null]
            ],
            null
        ]);
        assert_eq!(join_segments(&body), "삼성전자는 메모리를 만듭니다.");
    }

    #[test]
    fn malformed_payload_is_empty() {
        assert_eq!(join_segments(&serde_json::json!({"error": true})), "");
    }
}
