/// Server settings, read from the environment once at startup. A missing
/// data.go.kr key is not an error; the primary source is simply skipped.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_go_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5001);
        let data_go_api_key = std::env::var("DATA_GO_KR_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            host,
            port,
            data_go_api_key,
        }
    }
}
