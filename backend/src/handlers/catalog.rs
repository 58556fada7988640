//! HTTP handlers for suppliers, taxes and categories

use axum::{extract::State, http::StatusCode, Json};
use shared::models::{
    Category, CreateCategoryInput, CreateSupplierInput, CreateTaxInput, Supplier, Tax,
};

use crate::error::AppResult;
use crate::AppState;

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = state.catalog().list_suppliers().await?;
    Ok(Json(suppliers))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.catalog().create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_taxes(State(state): State<AppState>) -> AppResult<Json<Vec<Tax>>> {
    let taxes = state.catalog().list_taxes().await?;
    Ok(Json(taxes))
}

/// Create a tax rate; a default rate replaces the previous default
pub async fn create_tax(
    State(state): State<AppState>,
    Json(input): Json<CreateTaxInput>,
) -> AppResult<(StatusCode, Json<Tax>)> {
    let tax = state.catalog().create_tax(input).await?;
    Ok((StatusCode::CREATED, Json(tax)))
}

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.catalog().create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
