//! Settings handlers

use axum::{extract::State, Json};
use shared::models::{Settings, UpdateSettingsInput};

use crate::error::AppResult;
use crate::services::SettingsService;
use crate::AppState;

pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    let settings = SettingsService::new(state.db).get_settings().await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdateSettingsInput>,
) -> AppResult<Json<Settings>> {
    let settings = SettingsService::new(state.db).update_settings(input).await?;
    Ok(Json(settings))
}
