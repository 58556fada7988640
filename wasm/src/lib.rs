//! WebAssembly bindings for the stock ledger
//!
//! Runs the read-side projector in the browser:
//! - Stock status classification
//! - Line and aggregate valuation
//! - Selling price from margin
//! - Movement input checks before submission
//! - Daily movement chart and stock alerts
//!
//! Money crosses the boundary as decimal strings and structured data as JSON.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::projection::*;
pub use shared::validation::*;

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim()).map_err(|e| js_error(&format!("Invalid {}", field), e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization failed", e))
}

/// Today in the browser's local calendar
fn local_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}

/// Status of a stock quantity against its thresholds, as a snake_case string
#[wasm_bindgen]
pub fn classify_stock_status(quantity: i64, stock_min: i64, stock_max: Option<i64>) -> String {
    classify_stock(quantity, stock_min, stock_max).as_str().to_string()
}

/// Value of one stock line, rounded to cents
#[wasm_bindgen]
pub fn calculate_stock_value(cost_price: &str, quantity: i64) -> Result<String, JsValue> {
    let cost = parse_decimal(cost_price, "cost_price")?;
    Ok(stock_value(cost, quantity).to_string())
}

#[derive(Deserialize)]
struct StockLine {
    cost_price: Decimal,
    stock_quantity: i64,
}

/// Total value of `[{"cost_price": "1.20", "stock_quantity": 4}, ...]`,
/// rounded once over the sum
#[wasm_bindgen]
pub fn calculate_total_stock_value(lines_json: &str) -> Result<String, JsValue> {
    let lines: Vec<StockLine> =
        serde_json::from_str(lines_json).map_err(|e| js_error("Invalid lines JSON", e))?;
    let total = total_stock_value(lines.into_iter().map(|l| (l.cost_price, l.stock_quantity)));
    Ok(total.to_string())
}

/// Suggested selling price for a cost and margin percent
#[wasm_bindgen]
pub fn selling_price_from_margin(cost_price: &str, margin_percent: &str) -> Result<String, JsValue> {
    let cost = parse_decimal(cost_price, "cost_price")?;
    let margin = parse_decimal(margin_percent, "margin_percent")?;
    validate_margin_percent(margin).map_err(JsValue::from_str)?;
    Ok(price_from_margin(cost, margin).to_string())
}

/// Why a movement would be rejected, or `None` when its quantity is acceptable
#[wasm_bindgen]
pub fn movement_quantity_error(movement_type: &str, quantity: i64) -> Option<String> {
    match MovementType::from_str(movement_type) {
        Ok(t) => validate_movement_quantity(t, quantity)
            .err()
            .map(str::to_string),
        Err(e) => Some(e.to_string()),
    }
}

/// Daily in/out chart over a JSON array of movements.
///
/// `today` is `YYYY-MM-DD`; without it the browser date is used.
#[wasm_bindgen]
pub fn movement_chart(
    movements_json: &str,
    window_days: u32,
    today: Option<String>,
) -> Result<String, JsValue> {
    let movements: Vec<StockMovement> =
        serde_json::from_str(movements_json).map_err(|e| js_error("Invalid movements JSON", e))?;
    let today = match today {
        Some(day) => NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|e| js_error("Invalid date", e))?,
        None => local_today().ok_or_else(|| JsValue::from_str("Browser date unavailable"))?,
    };

    to_json(&aggregate_movements_by_day(&movements, window_days.max(1), today))
}

/// Alerts for a JSON catalog snapshot (products with their variants).
///
/// `read_ids_json` is an optional JSON array of alert ids already read.
#[wasm_bindgen]
pub fn stock_alerts(
    products_json: &str,
    settings_json: &str,
    read_ids_json: Option<String>,
) -> Result<String, JsValue> {
    let products: Vec<ProductWithVariants> =
        serde_json::from_str(products_json).map_err(|e| js_error("Invalid products JSON", e))?;
    let settings: Settings =
        serde_json::from_str(settings_json).map_err(|e| js_error("Invalid settings JSON", e))?;
    let read: HashSet<String> = match read_ids_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| js_error("Invalid read ids JSON", e))?,
        None => HashSet::new(),
    };

    to_json(&shared::alerts::derive_alerts(&products, &settings, &read))
}
