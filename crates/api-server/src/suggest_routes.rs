//! Ticker search route backed by the in-memory roster.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use market_core::StockEntry;
use serde::Deserialize;

use crate::AppState;

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

pub fn suggest_routes() -> Router<AppState> {
    Router::new().route("/api/suggest", get(suggest))
}

async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<StockEntry>> {
    Json(state.listing.search(&query.q))
}
