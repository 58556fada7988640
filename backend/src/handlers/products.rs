//! HTTP handlers for products, variants and selling prices

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{
    CreateProductInput, CreateVariantInput, PriceChangeInput, Product, ProductVariant,
    ProductWithVariants, SellingPriceHistory, UpdateProductInput,
};

use crate::error::AppResult;
use crate::handlers::movements::VariantQuery;
use crate::middleware::RequestContext;
use crate::services::catalog::ProductQuery;
use crate::services::price_history::PriceChange;
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = state.catalog().list_products(&query).await?;
    Ok(Json(products))
}

/// Create a product; a non-zero initial stock is written to the ledger
pub async fn create_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(input, ctx.actor()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductWithVariants>> {
    let product = state.catalog().get_product(&id).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let product = state.catalog().update_product(&id, input).await?;
    Ok(Json(product))
}

/// Hard delete, refused once the product has ledger history
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.catalog().deactivate_product(&id).await?;
    Ok(Json(product))
}

pub async fn set_product_selling_price(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(input): Json<PriceChangeInput>,
) -> AppResult<Json<PriceChange>> {
    let change = state
        .catalog()
        .update_selling_price(Some(&id), None, input.price, ctx.actor())
        .await?;
    Ok(Json(change))
}

/// Selling price history of a product, or of one of its variants with `?variant_id=`
pub async fn get_selling_price_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<VariantQuery>,
) -> AppResult<Json<Vec<SellingPriceHistory>>> {
    let history = state.prices().selling_price_history(&query.target(id)).await?;
    Ok(Json(history))
}

pub async fn list_variants(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<Vec<ProductVariant>>> {
    let variants = state.catalog().list_variants(&product_id).await?;
    Ok(Json(variants))
}

pub async fn create_variant(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(product_id): Path<String>,
    Json(input): Json<CreateVariantInput>,
) -> AppResult<(StatusCode, Json<ProductVariant>)> {
    let variant = state
        .catalog()
        .create_variant(&product_id, input, ctx.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog().delete_variant(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_variant_selling_price(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(input): Json<PriceChangeInput>,
) -> AppResult<Json<PriceChange>> {
    let change = state
        .catalog()
        .update_selling_price(None, Some(&id), input.price, ctx.actor())
        .await?;
    Ok(Json(change))
}
