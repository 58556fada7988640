//! Stock alert handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::RequestContext;
use crate::services::notification::AlertFeed;
use crate::services::NotificationService;
use crate::AppState;

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub acknowledged: usize,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Json<AlertFeed>> {
    let service = NotificationService::new(Arc::clone(&state.store));
    let feed = service.list_alerts(ctx.session()).await?;
    Ok(Json(feed))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(alert_id): Path<String>,
) -> AppResult<StatusCode> {
    let service = NotificationService::new(Arc::clone(&state.store));
    service.mark_read(ctx.session(), &alert_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(Arc::clone(&state.store));
    let acknowledged = service.mark_all_read(ctx.session()).await?;
    Ok(Json(MarkAllReadResponse { acknowledged }))
}
