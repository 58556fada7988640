//! Supplier prices and the immutable price history trails

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_not_negative;

/// A supplier's quoted price for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPrice {
    pub id: String,
    pub product_id: String,
    pub supplier_id: String,
    pub price: Decimal,
    pub min_quantity: i64,
    pub lead_time_days: Option<i32>,
    pub supplier_sku: Option<String>,
    pub purchase_url: Option<String>,
    pub is_preferred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSupplierPriceInput {
    pub supplier_id: String,
    #[validate(custom = "validate_not_negative")]
    pub price: Decimal,
    #[validate(range(min = 1, message = "Minimum quantity must be at least 1"))]
    pub min_quantity: Option<i64>,
    #[validate(range(min = 0, message = "Lead time cannot be negative"))]
    pub lead_time_days: Option<i32>,
    pub supplier_sku: Option<String>,
    #[validate(url(message = "Invalid purchase URL"))]
    pub purchase_url: Option<String>,
    #[serde(default)]
    pub is_preferred: bool,
}

/// Snapshot of a supplier price at the moment it changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPriceHistory {
    pub id: String,
    pub supplier_price_id: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

/// Marks a variant as not sourced through a supplier price.
/// Without an exclusion every variant of the product is included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSupplierExclusion {
    pub id: String,
    pub variant_id: String,
    pub supplier_price_id: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a product or variant selling price at the moment it changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPriceHistory {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

/// Body of a price change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChangeInput {
    pub price: Decimal,
}
