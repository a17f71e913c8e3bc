//! Quote lookup route.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use market_core::{Market, Quote, Ticker};
use serde::Deserialize;

use crate::{AppError, AppState};

#[derive(Deserialize)]
pub struct StockQuery {
    pub code: Option<String>,
    #[serde(default)]
    pub market: Market,
    #[serde(default)]
    pub name: String,
}

impl StockQuery {
    pub fn ticker(&self) -> Result<Ticker, AppError> {
        match &self.code {
            Some(code) if !code.trim().is_empty() => {
                Ok(Ticker::new(code.trim(), self.market))
            }
            _ => Err(AppError::MissingCode),
        }
    }
}

pub fn stock_routes() -> Router<AppState> {
    Router::new().route("/api/stock", get(get_stock))
}

async fn get_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Quote>, AppError> {
    let ticker = query.ticker()?;
    let quote = state.orchestrator.get_quote(&ticker, &query.name).await?;
    Ok(Json(quote))
}
