//! Business settings, a single row with code defaults until first saved

use sqlx::PgPool;

use shared::{validate_margin_percent, Settings, UpdateSettingsInput};

use crate::error::{check, AppError, AppResult};
use crate::store::rows::SettingsRow;

#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

impl SettingsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self) -> AppResult<Settings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT business_name, currency, default_margin, low_stock_alert,
                   out_of_stock_alert, email_daily_report, updated_at
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Settings::from).unwrap_or_default())
    }

    pub async fn update_settings(&self, input: UpdateSettingsInput) -> AppResult<Settings> {
        if let Some(margin) = input.default_margin {
            check("default_margin", validate_margin_percent(margin))?;
        }
        if matches!(&input.business_name, Some(name) if name.trim().is_empty()) {
            return Err(AppError::validation("business_name", "Business name cannot be empty"));
        }

        let settings = self.get_settings().await?.apply(input);

        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO settings (
                id, business_name, currency, default_margin, low_stock_alert,
                out_of_stock_alert, email_daily_report, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                business_name = EXCLUDED.business_name,
                currency = EXCLUDED.currency,
                default_margin = EXCLUDED.default_margin,
                low_stock_alert = EXCLUDED.low_stock_alert,
                out_of_stock_alert = EXCLUDED.out_of_stock_alert,
                email_daily_report = EXCLUDED.email_daily_report,
                updated_at = NOW()
            RETURNING business_name, currency, default_margin, low_stock_alert,
                      out_of_stock_alert, email_daily_report, updated_at
            "#,
        )
        .bind(&settings.business_name)
        .bind(settings.currency.code())
        .bind(settings.default_margin)
        .bind(settings.low_stock_alert)
        .bind(settings.out_of_stock_alert)
        .bind(settings.email_daily_report)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Settings updated");
        Ok(Settings::from(row))
    }
}
