//! HTTP handlers for the movement ledger

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::models::{MovementFilter, MovementRequest, MovementType, Reconciliation, StockMovement, StockTarget};
use shared::types::Pagination;

use crate::error::{AppError, AppResult};
use crate::services::ledger::{Transfer, TransferRequest};
use crate::services::ReportingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    #[serde(default)]
    pub all_variants: bool,
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub format: Option<String>, // "json" or "csv"
}

impl MovementQuery {
    fn to_filter(&self, paginate: bool) -> AppResult<MovementFilter> {
        let movement_type = self
            .movement_type
            .as_deref()
            .map(|t| t.parse::<MovementType>())
            .transpose()
            .map_err(|e| AppError::validation("type", e.to_string()))?;

        let (limit, offset) = if paginate {
            let defaults = Pagination::default();
            let pagination = Pagination {
                page: self.page.unwrap_or(defaults.page),
                per_page: self.per_page.unwrap_or(defaults.per_page),
            };
            let (limit, offset) = pagination.limit_offset();
            (Some(limit), Some(offset))
        } else {
            (None, None)
        };

        Ok(MovementFilter {
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
            all_variants: self.all_variants,
            movement_type,
            from: self.from,
            to: self.to,
            limit,
            offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchMovementInput {
    pub movements: Vec<MovementRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StockLevelInput {
    pub level: i64,
    pub variant_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub variant_id: Option<String>,
}

impl VariantQuery {
    pub fn target(&self, product_id: String) -> StockTarget {
        StockTarget {
            product_id,
            variant_id: self.variant_id.clone(),
        }
    }
}

/// Record a single stock movement
pub async fn create_movement(
    State(state): State<AppState>,
    Json(input): Json<MovementRequest>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let movement = state.engine().apply_movement(input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Record several movements atomically
pub async fn create_movement_batch(
    State(state): State<AppState>,
    Json(input): Json<BatchMovementInput>,
) -> AppResult<(StatusCode, Json<Vec<StockMovement>>)> {
    let movements = state.engine().apply_batch(input.movements).await?;
    Ok((StatusCode::CREATED, Json(movements)))
}

/// Move stock between two targets
pub async fn transfer_stock(
    State(state): State<AppState>,
    Json(input): Json<TransferRequest>,
) -> AppResult<(StatusCode, Json<Transfer>)> {
    let transfer = state.engine().transfer_stock(input).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// List movements, newest first, as JSON or CSV
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<impl IntoResponse> {
    let export = query.format.as_deref() == Some("csv");
    let filter = query.to_filter(!export)?;
    let movements = state.engine().list_movements(&filter).await?;

    if export {
        let csv = ReportingService::export_movements_csv(&movements)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"stock_movements.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(movements).into_response())
    }
}

pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StockMovement>> {
    let movement = state.engine().get_movement(&id).await?;
    Ok(Json(movement))
}

/// Set a product or variant to an absolute stock level
pub async fn set_stock_level(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(input): Json<StockLevelInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let target = StockTarget {
        product_id,
        variant_id: input.variant_id,
    };
    let movement = state
        .engine()
        .set_stock_level(target, input.level, input.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Replay the ledger of a product or variant against its stored quantity
pub async fn reconcile_stock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<VariantQuery>,
) -> AppResult<Json<Reconciliation>> {
    let reconciliation = state.engine().reconcile(&query.target(product_id)).await?;
    Ok(Json(reconciliation))
}
