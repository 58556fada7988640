//! Stock alert notifications
//!
//! Alerts are derived on every read. Only acknowledgements are stored,
//! keyed by the caller's session id.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use shared::{cleared_acknowledgements, derive_alerts, unread_count, StockAlert};

use crate::error::{AppError, AppResult};
use crate::services::catalog::CatalogService;
use crate::services::settings::SettingsService;
use crate::store::PgStore;

#[derive(Debug, Clone, Serialize)]
pub struct AlertFeed {
    pub alerts: Vec<StockAlert>,
    pub unread_count: usize,
}

pub struct NotificationService {
    store: Arc<PgStore>,
}

fn require_session(session_id: Option<&str>) -> AppResult<&str> {
    session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("X-Session-Id", "A session id is required to acknowledge alerts"))
}

impl NotificationService {
    pub fn new(store: Arc<PgStore>) -> Self {
        Self { store }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// Alerts raised right now, plus the session's stored acknowledgements
    async fn current_alerts(
        &self,
        session_id: Option<&str>,
    ) -> AppResult<(Vec<StockAlert>, HashSet<String>)> {
        let products = CatalogService::new(Arc::clone(&self.store))
            .list_products_with_variants(true)
            .await?;
        let settings = SettingsService::new(self.db().clone()).get_settings().await?;
        let acknowledged = match session_id {
            Some(session_id) => self.acknowledged(session_id).await?,
            None => HashSet::new(),
        };

        let alerts = derive_alerts(&products, &settings, &acknowledged);
        Ok((alerts, acknowledged))
    }

    async fn acknowledged(&self, session_id: &str) -> AppResult<HashSet<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT alert_id FROM alert_acknowledgements WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(self.db())
        .await?;

        Ok(ids.into_iter().collect())
    }

    pub async fn list_alerts(&self, session_id: Option<&str>) -> AppResult<AlertFeed> {
        let (alerts, _) = self.current_alerts(session_id).await?;
        Ok(AlertFeed {
            unread_count: unread_count(&alerts),
            alerts,
        })
    }

    /// Acknowledge one alert for the session; repeating it is a no-op
    pub async fn mark_read(&self, session_id: Option<&str>, alert_id: &str) -> AppResult<()> {
        let session_id = require_session(session_id)?;

        sqlx::query(
            r#"
            INSERT INTO alert_acknowledgements (session_id, alert_id)
            VALUES ($1, $2)
            ON CONFLICT (session_id, alert_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(alert_id)
        .execute(self.db())
        .await?;

        Ok(())
    }

    /// Acknowledge every alert currently raised. Alerts raised later start unread.
    ///
    /// Acknowledgements of alerts that have since cleared are dropped in the
    /// same transaction.
    pub async fn mark_all_read(&self, session_id: Option<&str>) -> AppResult<usize> {
        let session_id = require_session(session_id)?;
        let (alerts, acknowledged) = self.current_alerts(Some(session_id)).await?;
        let cleared = cleared_acknowledgements(&alerts, &acknowledged);
        let ids: Vec<String> = alerts.into_iter().filter(|a| !a.read).map(|a| a.id).collect();

        let mut tx = self.db().begin().await?;
        if !cleared.is_empty() {
            sqlx::query(
                "DELETE FROM alert_acknowledgements WHERE session_id = $1 AND alert_id = ANY($2)",
            )
            .bind(session_id)
            .bind(&cleared)
            .execute(&mut *tx)
            .await?;
        }
        if !ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO alert_acknowledgements (session_id, alert_id)
                SELECT $1, UNNEST($2::text[])
                ON CONFLICT (session_id, alert_id) DO NOTHING
                "#,
            )
            .bind(session_id)
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(
            session_id,
            acknowledged = ids.len(),
            pruned = cleared.len(),
            "Alerts marked read"
        );
        Ok(ids.len())
    }
}
