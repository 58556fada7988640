//! Dashboard read models, built by the projector over store snapshots

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shared::{
    aggregate_movements_by_day, chart_window, classify_stock, movement_type_totals,
    stock_level_counts, stock_value, total_stock_value, Currency, MovementChart, MovementFilter,
    MovementTypeTotal, ProductWithVariants, StockLevelCount, StockStatus,
};

use crate::config::LedgerConfig;
use crate::error::{AppError, AppResult};
use crate::services::catalog::CatalogService;
use crate::services::settings::SettingsService;
use crate::store::{LedgerStore, PgStore};

/// One stock line: a product's own stock or one variant's
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockItem {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub name: String,
    pub stock_quantity: i64,
    pub stock_min: i64,
    pub stock_max: Option<i64>,
    pub cost_price: Decimal,
    pub status: StockStatus,
    pub stock_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_variants: usize,
    pub total_stock_value: Decimal,
    pub currency: Currency,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub stock_levels: Vec<StockLevelCount>,
    pub low_stock_items: Vec<StockItem>,
    pub top_items_by_value: Vec<StockItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCharts {
    pub window_days: u32,
    pub movements: MovementChart,
    pub movement_types: Vec<MovementTypeTotal>,
}

/// Flatten products and variants into stock lines, products first
pub fn stock_items(products: &[ProductWithVariants]) -> Vec<StockItem> {
    let mut items = Vec::new();
    for entry in products {
        let product = &entry.product;
        items.push(StockItem {
            product_id: product.id.clone(),
            variant_id: None,
            name: product.name.clone(),
            stock_quantity: product.stock_quantity,
            stock_min: product.stock_min,
            stock_max: product.stock_max,
            cost_price: product.cost_price,
            status: classify_stock(product.stock_quantity, product.stock_min, product.stock_max),
            stock_value: stock_value(product.cost_price, product.stock_quantity),
        });
        for variant in &entry.variants {
            items.push(StockItem {
                product_id: product.id.clone(),
                variant_id: Some(variant.id.clone()),
                name: format!("{} - {}", product.name, variant.name),
                stock_quantity: variant.stock_quantity,
                stock_min: variant.stock_min,
                stock_max: variant.stock_max,
                cost_price: variant.cost_price,
                status: classify_stock(variant.stock_quantity, variant.stock_min, variant.stock_max),
                stock_value: stock_value(variant.cost_price, variant.stock_quantity),
            });
        }
    }
    items
}

/// Assemble dashboard stats from a catalog snapshot
pub fn build_stats(
    products: &[ProductWithVariants],
    currency: Currency,
    low_stock_limit: usize,
    top_limit: usize,
) -> DashboardStats {
    let items = stock_items(products);

    let total_stock_value = total_stock_value(items.iter().map(|i| (i.cost_price, i.stock_quantity)));
    let stock_levels = stock_level_counts(items.iter().map(|i| (i.stock_quantity, i.stock_min, i.stock_max)));

    let mut low_stock_items: Vec<StockItem> = items
        .iter()
        .filter(|i| matches!(i.status, StockStatus::LowStock | StockStatus::OutOfStock))
        .cloned()
        .collect();
    let low_stock_count = low_stock_items
        .iter()
        .filter(|i| i.status == StockStatus::LowStock)
        .count();
    let out_of_stock_count = low_stock_items.len() - low_stock_count;
    low_stock_items.sort_by(|a, b| a.stock_quantity.cmp(&b.stock_quantity).then_with(|| a.name.cmp(&b.name)));
    low_stock_items.truncate(low_stock_limit);

    let mut top_items_by_value = items;
    top_items_by_value.sort_by(|a, b| b.stock_value.cmp(&a.stock_value).then_with(|| a.name.cmp(&b.name)));
    top_items_by_value.truncate(top_limit);

    DashboardStats {
        total_products: products.len(),
        total_variants: products.iter().map(|p| p.variants.len()).sum(),
        total_stock_value,
        currency,
        low_stock_count,
        out_of_stock_count,
        stock_levels,
        low_stock_items,
        top_items_by_value,
    }
}

pub struct DashboardService {
    store: Arc<PgStore>,
    config: LedgerConfig,
}

impl DashboardService {
    pub fn new(store: Arc<PgStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub async fn get_stats(&self) -> AppResult<DashboardStats> {
        let catalog = CatalogService::new(Arc::clone(&self.store));
        let products = catalog.list_products_with_variants(true).await?;
        let settings = SettingsService::new(self.store.pool().clone()).get_settings().await?;

        Ok(build_stats(
            &products,
            settings.currency,
            self.config.low_stock_list_limit,
            self.config.top_products_limit,
        ))
    }

    pub async fn get_charts(&self, window_days: Option<u32>) -> AppResult<DashboardCharts> {
        let window_days = window_days.unwrap_or(self.config.chart_window_days).max(1);
        if window_days > self.config.max_chart_window_days {
            return Err(AppError::validation(
                "days",
                format!(
                    "Chart window cannot exceed {} days",
                    self.config.max_chart_window_days
                ),
            ));
        }
        let today = Utc::now().date_naive();
        let movements = self
            .store
            .list_movements(&MovementFilter {
                from: Some(start_of_day(chart_window(today, window_days).start)),
                ..Default::default()
            })
            .await?;

        Ok(DashboardCharts {
            window_days,
            movements: aggregate_movements_by_day(&movements, window_days, today),
            movement_types: movement_type_totals(&movements),
        })
    }
}

fn start_of_day(day: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}
