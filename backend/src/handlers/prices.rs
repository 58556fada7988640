//! HTTP handlers for supplier prices, their history and variant exclusions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{
    CreateSupplierPriceInput, PriceChangeInput, SupplierPrice, SupplierPriceHistory,
    VariantSupplierExclusion,
};

use crate::error::AppResult;
use crate::middleware::RequestContext;
use crate::services::price_history::PriceChange;
use crate::AppState;

pub async fn list_supplier_prices(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<Vec<SupplierPrice>>> {
    let prices = state.catalog().list_supplier_prices(&product_id).await?;
    Ok(Json(prices))
}

pub async fn create_supplier_price(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(product_id): Path<String>,
    Json(input): Json<CreateSupplierPriceInput>,
) -> AppResult<(StatusCode, Json<SupplierPrice>)> {
    let price = state
        .catalog()
        .create_supplier_price(&product_id, input, ctx.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(price)))
}

pub async fn update_supplier_price(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(input): Json<PriceChangeInput>,
) -> AppResult<Json<PriceChange>> {
    let change = state
        .catalog()
        .update_supplier_price(&id, input.price, ctx.actor())
        .await?;
    Ok(Json(change))
}

pub async fn get_supplier_price_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<SupplierPriceHistory>>> {
    let history = state.prices().supplier_price_history(&id).await?;
    Ok(Json(history))
}

pub async fn delete_supplier_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog().delete_supplier_price(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_exclusions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<VariantSupplierExclusion>>> {
    let exclusions = state.catalog().list_exclusions(&id).await?;
    Ok(Json(exclusions))
}

/// Stop a supplier price from applying to one variant
pub async fn exclude_variant(
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(String, String)>,
) -> AppResult<Json<VariantSupplierExclusion>> {
    let exclusion = state.catalog().exclude_variant(&id, &variant_id).await?;
    Ok(Json(exclusion))
}

pub async fn include_variant(
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state.catalog().include_variant(&id, &variant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
