pub mod analysis_routes;
pub mod config;
pub mod error;
pub mod stock_routes;
pub mod suggest_routes;

use axum::Router;
use market_data::StockListing;
use orchestrator::Orchestrator;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::Config;
pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub listing: Arc<StockListing>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(stock_routes::stock_routes())
        .merge(analysis_routes::analysis_routes())
        .merge(suggest_routes::suggest_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.data_go_api_key.is_none() {
        tracing::warn!("DATA_GO_KR_API_KEY not set; primary source disabled, using fallback only");
    }

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(config.data_go_api_key.clone())),
        listing: Arc::new(StockListing::new()),
    };

    // Roster load runs in the background; search serves the built-in list
    // until it completes.
    let listing = Arc::clone(&state.listing);
    tokio::spawn(async move {
        listing.load().await;
    });

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "stock lookup server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
