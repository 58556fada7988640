//! Database row types
//!
//! `shared` stays free of sqlx, so every table gets a `FromRow` struct here
//! that converts into its domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use shared::{
    Category, Currency, MovementType, Product, ProductVariant, SellingPriceHistory, Settings,
    StockMovement, Supplier, SupplierPrice, SupplierPriceHistory, Tax, VariantSupplierExclusion,
};

use crate::error::AppError;

pub(crate) const PRODUCT_COLUMNS: &str = "id, sku, barcode, name, description, category_id, \
     cost_price, selling_price, margin_percent, tax_id, stock_quantity, stock_min, stock_max, \
     unit, supplier_id, is_active, options, created_at, updated_at";

pub(crate) const VARIANT_COLUMNS: &str = "id, product_id, name, sku, barcode, cost_price, \
     margin_percent, price, tax_id, stock_quantity, stock_min, stock_max, supplier_id, \
     created_at, updated_at";

pub(crate) const MOVEMENT_COLUMNS: &str = "id, product_id, variant_id, type AS movement_type, \
     quantity, stock_before, stock_after, unit_cost, reference, reason, supplier_id, created_at";

pub(crate) const SUPPLIER_PRICE_COLUMNS: &str = "id, product_id, supplier_id, price, min_quantity, \
     lead_time_days, supplier_sku, purchase_url, is_preferred, created_at, updated_at";

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    id: String,
    sku: Option<String>,
    barcode: Option<String>,
    name: String,
    description: Option<String>,
    category_id: Option<String>,
    cost_price: Decimal,
    selling_price: Decimal,
    margin_percent: Decimal,
    tax_id: Option<String>,
    stock_quantity: i64,
    stock_min: i64,
    stock_max: Option<i64>,
    unit: String,
    supplier_id: Option<String>,
    is_active: bool,
    options: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            barcode: row.barcode,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            margin_percent: row.margin_percent,
            tax_id: row.tax_id,
            stock_quantity: row.stock_quantity,
            stock_min: row.stock_min,
            stock_max: row.stock_max,
            unit: row.unit,
            supplier_id: row.supplier_id,
            is_active: row.is_active,
            options: row.options,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VariantRow {
    id: String,
    product_id: String,
    name: String,
    sku: Option<String>,
    barcode: Option<String>,
    cost_price: Decimal,
    margin_percent: Decimal,
    price: Decimal,
    tax_id: Option<String>,
    stock_quantity: i64,
    stock_min: i64,
    stock_max: Option<i64>,
    supplier_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VariantRow> for ProductVariant {
    fn from(row: VariantRow) -> Self {
        ProductVariant {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            sku: row.sku,
            barcode: row.barcode,
            cost_price: row.cost_price,
            margin_percent: row.margin_percent,
            price: row.price,
            tax_id: row.tax_id,
            stock_quantity: row.stock_quantity,
            stock_min: row.stock_min,
            stock_max: row.stock_max,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MovementRow {
    id: String,
    product_id: String,
    variant_id: Option<String>,
    movement_type: String,
    quantity: i64,
    stock_before: i64,
    stock_after: i64,
    unit_cost: Option<Decimal>,
    reference: Option<String>,
    reason: Option<String>,
    supplier_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type: MovementType = row
            .movement_type
            .parse()
            .map_err(|e| AppError::Internal(format!("movement {}: {}", row.id, e)))?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            movement_type,
            quantity: row.quantity,
            stock_before: row.stock_before,
            stock_after: row.stock_after,
            unit_cost: row.unit_cost,
            reference: row.reference,
            reason: row.reason,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
        })
    }
}

pub(crate) fn into_movements(rows: Vec<MovementRow>) -> Result<Vec<StockMovement>, AppError> {
    rows.into_iter().map(StockMovement::try_from).collect()
}

#[derive(Debug, FromRow)]
pub(crate) struct SupplierPriceRow {
    id: String,
    product_id: String,
    supplier_id: String,
    price: Decimal,
    min_quantity: i64,
    lead_time_days: Option<i32>,
    supplier_sku: Option<String>,
    purchase_url: Option<String>,
    is_preferred: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierPriceRow> for SupplierPrice {
    fn from(row: SupplierPriceRow) -> Self {
        SupplierPrice {
            id: row.id,
            product_id: row.product_id,
            supplier_id: row.supplier_id,
            price: row.price,
            min_quantity: row.min_quantity,
            lead_time_days: row.lead_time_days,
            supplier_sku: row.supplier_sku,
            purchase_url: row.purchase_url,
            is_preferred: row.is_preferred,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SupplierPriceHistoryRow {
    id: String,
    supplier_price_id: String,
    price: Decimal,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl From<SupplierPriceHistoryRow> for SupplierPriceHistory {
    fn from(row: SupplierPriceHistoryRow) -> Self {
        SupplierPriceHistory {
            id: row.id,
            supplier_price_id: row.supplier_price_id,
            price: row.price,
            created_at: row.created_at,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SellingPriceHistoryRow {
    id: String,
    product_id: String,
    variant_id: Option<String>,
    price: Decimal,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl From<SellingPriceHistoryRow> for SellingPriceHistory {
    fn from(row: SellingPriceHistoryRow) -> Self {
        SellingPriceHistory {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            price: row.price,
            created_at: row.created_at,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ExclusionRow {
    id: String,
    variant_id: String,
    supplier_price_id: String,
    created_at: DateTime<Utc>,
}

impl From<ExclusionRow> for VariantSupplierExclusion {
    fn from(row: ExclusionRow) -> Self {
        VariantSupplierExclusion {
            id: row.id,
            variant_id: row.variant_id,
            supplier_price_id: row.supplier_price_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SupplierRow {
    id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            country: row.country,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TaxRow {
    id: String,
    name: String,
    rate: Decimal,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaxRow> for Tax {
    fn from(row: TaxRow) -> Self {
        Tax {
            id: row.id,
            name: row.name,
            rate: row.rate,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
    parent_id: Option<String>,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            parent_id: row.parent_id,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SettingsRow {
    business_name: String,
    currency: String,
    default_margin: Decimal,
    low_stock_alert: bool,
    out_of_stock_alert: bool,
    email_daily_report: bool,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Settings {
            business_name: row.business_name,
            currency: Currency::from_code(&row.currency),
            default_margin: row.default_margin,
            low_stock_alert: row.low_stock_alert,
            out_of_stock_alert: row.out_of_stock_alert,
            email_daily_report: row.email_daily_report,
            updated_at: row.updated_at,
        }
    }
}
