//! Product and variant models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::double_option;
use crate::validation::validate_not_negative;

pub const DEFAULT_MARGIN_PERCENT: i64 = 30;
pub const DEFAULT_UNIT: &str = "unit";

/// A sellable base item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub margin_percent: Decimal,
    pub tax_id: Option<String>,
    pub stock_quantity: i64,
    pub stock_min: i64,
    pub stock_max: Option<i64>,
    pub unit: String,
    pub supplier_id: Option<String>,
    pub is_active: bool,
    pub options: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product's sellable sub-unit with its own stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub cost_price: Decimal,
    pub margin_percent: Decimal,
    pub price: Decimal,
    pub tax_id: Option<String>,
    pub stock_quantity: i64,
    pub stock_min: i64,
    pub stock_max: Option<i64>,
    pub supplier_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product together with its variants, as read by alerting and dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "SKU must be 1-64 characters"))]
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    #[validate(custom = "validate_not_negative")]
    pub cost_price: Option<Decimal>,
    #[validate(custom = "validate_not_negative")]
    pub selling_price: Option<Decimal>,
    pub margin_percent: Option<Decimal>,
    pub tax_id: Option<String>,
    #[validate(range(min = 0, message = "Opening stock cannot be negative"))]
    pub initial_stock: Option<i64>,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub stock_min: Option<i64>,
    #[validate(range(min = 0, message = "Maximum stock cannot be negative"))]
    pub stock_max: Option<i64>,
    pub unit: Option<String>,
    pub supplier_id: Option<String>,
    pub options: Option<serde_json::Value>,
}

/// Descriptive edits; stock quantity and selling price are not editable here.
///
/// Nullable fields are double options: absent keeps the value, `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<String>>,
    #[validate(custom = "validate_not_negative")]
    pub cost_price: Option<Decimal>,
    pub margin_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<Option<String>>,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub stock_min: Option<i64>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub stock_max: Option<Option<i64>>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub options: Option<Option<serde_json::Value>>,
}

impl Product {
    /// Fold an edit into the product. Thresholds are not re-checked here.
    pub fn apply(mut self, input: UpdateProductInput) -> Self {
        if let Some(v) = input.name {
            self.name = v;
        }
        if let Some(v) = input.sku {
            self.sku = v;
        }
        if let Some(v) = input.barcode {
            self.barcode = v;
        }
        if let Some(v) = input.description {
            self.description = v;
        }
        if let Some(v) = input.category_id {
            self.category_id = v;
        }
        if let Some(v) = input.cost_price {
            self.cost_price = v;
        }
        if let Some(v) = input.margin_percent {
            self.margin_percent = v;
        }
        if let Some(v) = input.tax_id {
            self.tax_id = v;
        }
        if let Some(v) = input.stock_min {
            self.stock_min = v;
        }
        if let Some(v) = input.stock_max {
            self.stock_max = v;
        }
        if let Some(v) = input.unit {
            self.unit = v;
        }
        if let Some(v) = input.supplier_id {
            self.supplier_id = v;
        }
        if let Some(v) = input.options {
            self.options = v;
        }
        self
    }
}

/// Input for creating a variant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVariantInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[validate(custom = "validate_not_negative")]
    pub cost_price: Option<Decimal>,
    pub margin_percent: Option<Decimal>,
    #[validate(custom = "validate_not_negative")]
    pub price: Option<Decimal>,
    pub tax_id: Option<String>,
    #[validate(range(min = 0, message = "Opening stock cannot be negative"))]
    pub initial_stock: Option<i64>,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub stock_min: Option<i64>,
    #[validate(range(min = 0, message = "Maximum stock cannot be negative"))]
    pub stock_max: Option<i64>,
    pub supplier_id: Option<String>,
}

/// Selling price derived from cost and margin percent, rounded to cents
pub fn price_from_margin(cost_price: Decimal, margin_percent: Decimal) -> Decimal {
    let price = cost_price * (Decimal::ONE + margin_percent / Decimal::from(100));
    price.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_from_margin() {
        let cost = Decimal::from_str("10.00").unwrap();
        assert_eq!(
            price_from_margin(cost, Decimal::from(DEFAULT_MARGIN_PERCENT)),
            Decimal::from_str("13.00").unwrap()
        );
        let odd = Decimal::from_str("3.33").unwrap();
        assert_eq!(
            price_from_margin(odd, Decimal::from(50)),
            Decimal::from_str("5.00").unwrap()
        );
    }

    #[test]
    fn test_create_product_input_validation() {
        let input = CreateProductInput {
            name: "".to_string(),
            sku: None,
            barcode: None,
            description: None,
            category_id: None,
            cost_price: Some(Decimal::from(-1)),
            selling_price: None,
            margin_percent: None,
            tax_id: None,
            initial_stock: Some(-5),
            stock_min: None,
            stock_max: None,
            unit: None,
            supplier_id: None,
            options: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("cost_price"));
        assert!(fields.contains_key("initial_stock"));
    }

    fn stocked_product() -> Product {
        let now = Utc::now();
        Product {
            id: "prd_1".to_string(),
            sku: Some("CUP-01".to_string()),
            barcode: None,
            name: "Cup".to_string(),
            description: Some("Ceramic".to_string()),
            category_id: Some("cat_1".to_string()),
            cost_price: Decimal::from(2),
            selling_price: Decimal::from(4),
            margin_percent: Decimal::from(DEFAULT_MARGIN_PERCENT),
            tax_id: None,
            stock_quantity: 12,
            stock_min: 2,
            stock_max: Some(40),
            unit: DEFAULT_UNIT.to_string(),
            supplier_id: None,
            is_active: true,
            options: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_input_null_clears_and_absent_keeps() {
        let input: UpdateProductInput =
            serde_json::from_str(r#"{"stock_max":null,"sku":null,"name":"Mug"}"#).unwrap();
        assert_eq!(input.stock_max, Some(None));
        assert_eq!(input.category_id, None);

        let product = stocked_product().apply(input);
        assert_eq!(product.name, "Mug");
        assert_eq!(product.stock_max, None);
        assert_eq!(product.sku, None);
        assert_eq!(product.category_id.as_deref(), Some("cat_1"));
        assert_eq!(product.description.as_deref(), Some("Ceramic"));
    }

    #[test]
    fn test_update_input_sets_nullable_value() {
        let input: UpdateProductInput =
            serde_json::from_str(r#"{"stock_max":25,"category_id":"cat_2"}"#).unwrap();
        let product = stocked_product().apply(input);
        assert_eq!(product.stock_max, Some(25));
        assert_eq!(product.category_id.as_deref(), Some("cat_2"));
        assert_eq!(product.stock_quantity, 12);
    }
}
