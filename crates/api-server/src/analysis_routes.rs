//! Candle-analysis route.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use market_core::AnalysisReport;

use crate::stock_routes::StockQuery;
use crate::{AppError, AppState};

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analysis", get(get_analysis))
}

async fn get_analysis(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<AnalysisReport>, AppError> {
    let ticker = query.ticker()?;
    let report = state.orchestrator.get_analysis(&ticker, &query.name).await?;
    Ok(Json(report))
}
