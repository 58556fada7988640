//! Dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::dashboard::{DashboardCharts, DashboardStats};
use crate::services::DashboardService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<u32>,
}

fn service(state: &AppState) -> DashboardService {
    DashboardService::new(Arc::clone(&state.store), state.config.ledger.clone())
}

/// Stock valuation and status counts
pub async fn get_dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = service(&state).get_stats().await?;
    Ok(Json(stats))
}

/// Daily movement chart, 14 days unless `?days=` says otherwise
pub async fn get_dashboard_charts(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<DashboardCharts>> {
    let charts = service(&state).get_charts(query.days).await?;
    Ok(Json(charts))
}
