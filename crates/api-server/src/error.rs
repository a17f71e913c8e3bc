use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use market_core::MarketError;
use serde_json::json;

/// Request-level failures, mapped to `{"error": "..."}` bodies. Upstream
/// details stay in the logs and never reach the client.
pub enum AppError {
    MissingCode,
    Market(MarketError),
}

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        AppError::Market(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingCode => (StatusCode::BAD_REQUEST, "종목코드가 필요합니다."),
            AppError::Market(MarketError::UpstreamUnavailable(code)) => {
                tracing::warn!(code = %code, "no market data for request");
                (StatusCode::NOT_FOUND, "주가 데이터를 가져올 수 없습니다.")
            }
            AppError::Market(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "분석 중 오류가 발생했습니다.",
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
