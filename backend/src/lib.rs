//! Stock ledger backend
//!
//! Entity store, movement ledger, stock mutation engine and price history,
//! served over a thin axum API.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{CatalogService, PriceHistoryRecorder, StockMutationEngine};
use store::PgStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub store: Arc<PgStore>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        Self {
            store: Arc::new(PgStore::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }

    pub fn engine(&self) -> StockMutationEngine<PgStore> {
        StockMutationEngine::new(Arc::clone(&self.store), self.config.ledger.max_retries)
    }

    pub fn prices(&self) -> PriceHistoryRecorder<PgStore> {
        PriceHistoryRecorder::new(Arc::clone(&self.store))
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(Arc::clone(&self.store))
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Stock Ledger API v1"
}
