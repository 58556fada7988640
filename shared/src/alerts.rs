//! Stock alerts derived from current product and variant state
//!
//! Alerts are advisory. Their ids are stable (`low-stock-<id>`,
//! `out-of-stock-variant-<id>`, ...) so acknowledgements stored elsewhere
//! can be matched against freshly derived alerts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{ProductWithVariants, Settings};
use crate::projection::{classify_stock, StockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    OutOfStock,
    LowStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub read: bool,
}

pub fn product_alert_id(kind: AlertKind, product_id: &str) -> String {
    match kind {
        AlertKind::OutOfStock => format!("out-of-stock-{}", product_id),
        AlertKind::LowStock => format!("low-stock-{}", product_id),
    }
}

pub fn variant_alert_id(kind: AlertKind, variant_id: &str) -> String {
    match kind {
        AlertKind::OutOfStock => format!("out-of-stock-variant-{}", variant_id),
        AlertKind::LowStock => format!("low-stock-variant-{}", variant_id),
    }
}

fn alert_kind(status: StockStatus, settings: &Settings) -> Option<AlertKind> {
    match status {
        StockStatus::OutOfStock if settings.out_of_stock_alert => Some(AlertKind::OutOfStock),
        StockStatus::LowStock if settings.low_stock_alert => Some(AlertKind::LowStock),
        _ => None,
    }
}

/// Derive alerts for every product and variant, products first.
///
/// `acknowledged` holds alert ids the current session has marked as read.
pub fn derive_alerts(
    products: &[ProductWithVariants],
    settings: &Settings,
    acknowledged: &HashSet<String>,
) -> Vec<StockAlert> {
    let mut alerts = Vec::new();

    for entry in products {
        let product = &entry.product;
        let status = classify_stock(product.stock_quantity, product.stock_min, product.stock_max);
        if let Some(kind) = alert_kind(status, settings) {
            let id = product_alert_id(kind, &product.id);
            let (severity, title, description) = match kind {
                AlertKind::OutOfStock => (
                    AlertSeverity::Error,
                    "Out of Stock",
                    format!("{} is out of stock", product.name),
                ),
                AlertKind::LowStock => (
                    AlertSeverity::Warning,
                    "Low Stock Alert",
                    format!(
                        "{} has only {} units left (min: {})",
                        product.name, product.stock_quantity, product.stock_min
                    ),
                ),
            };
            alerts.push(StockAlert {
                read: acknowledged.contains(&id),
                id,
                kind,
                severity,
                title: title.to_string(),
                description,
                product_id: product.id.clone(),
                variant_id: None,
            });
        }

        for variant in &entry.variants {
            let status = classify_stock(variant.stock_quantity, variant.stock_min, variant.stock_max);
            let Some(kind) = alert_kind(status, settings) else {
                continue;
            };
            let id = variant_alert_id(kind, &variant.id);
            let (severity, title, description) = match kind {
                AlertKind::OutOfStock => (
                    AlertSeverity::Error,
                    "Out of Stock",
                    format!("{} - {} is out of stock", product.name, variant.name),
                ),
                AlertKind::LowStock => (
                    AlertSeverity::Warning,
                    "Low Stock Alert",
                    format!(
                        "{} - {} has only {} units left",
                        product.name, variant.name, variant.stock_quantity
                    ),
                ),
            };
            alerts.push(StockAlert {
                read: acknowledged.contains(&id),
                id,
                kind,
                severity,
                title: title.to_string(),
                description,
                product_id: product.id.clone(),
                variant_id: Some(variant.id.clone()),
            });
        }
    }

    alerts
}

pub fn unread_count(alerts: &[StockAlert]) -> usize {
    alerts.iter().filter(|a| !a.read).count()
}

/// Acknowledged ids with no matching alert in `alerts`, sorted.
///
/// Once an alert clears its acknowledgement is dead weight; if the same
/// condition comes back it is raised unread again.
pub fn cleared_acknowledgements(alerts: &[StockAlert], acknowledged: &HashSet<String>) -> Vec<String> {
    let raised: HashSet<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    let mut cleared: Vec<String> = acknowledged
        .iter()
        .filter(|id| !raised.contains(id.as_str()))
        .cloned()
        .collect();
    cleared.sort();
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, ProductVariant};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(id: &str, quantity: i64, min: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: None,
            barcode: None,
            name: format!("Product {}", id),
            description: None,
            category_id: None,
            cost_price: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            margin_percent: Decimal::from(30),
            tax_id: None,
            stock_quantity: quantity,
            stock_min: min,
            stock_max: None,
            unit: "unit".to_string(),
            supplier_id: None,
            is_active: true,
            options: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(id: &str, product_id: &str, quantity: i64, min: i64) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            product_id: product_id.to_string(),
            name: "Large".to_string(),
            sku: None,
            barcode: None,
            cost_price: Decimal::ZERO,
            margin_percent: Decimal::from(30),
            price: Decimal::ZERO,
            tax_id: None,
            stock_quantity: quantity,
            stock_min: min,
            stock_max: None,
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_derive_alert_ids() {
        let products = vec![
            ProductWithVariants {
                product: product("p1", 0, 5),
                variants: vec![variant("v1", "p1", 2, 5), variant("v2", "p1", 50, 5)],
            },
            ProductWithVariants {
                product: product("p2", 3, 5),
                variants: vec![variant("v3", "p2", 0, 0)],
            },
            ProductWithVariants {
                product: product("p3", 30, 5),
                variants: vec![],
            },
        ];
        let alerts = derive_alerts(&products, &Settings::default(), &HashSet::new());
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "out-of-stock-p1",
                "low-stock-variant-v1",
                "low-stock-p2",
                "out-of-stock-variant-v3",
            ]
        );
        assert_eq!(alerts[0].severity, AlertSeverity::Error);
        assert_eq!(alerts[2].description, "Product p2 has only 3 units left (min: 5)");
        assert_eq!(unread_count(&alerts), 4);
    }

    #[test]
    fn test_acknowledged_alerts_are_read() {
        let products = vec![ProductWithVariants {
            product: product("p1", 1, 5),
            variants: vec![],
        }];
        let acknowledged: HashSet<String> = ["low-stock-p1".to_string()].into_iter().collect();
        let alerts = derive_alerts(&products, &Settings::default(), &acknowledged);
        assert!(alerts[0].read);
        assert_eq!(unread_count(&alerts), 0);
    }

    #[test]
    fn test_settings_toggles() {
        let products = vec![ProductWithVariants {
            product: product("p1", 0, 5),
            variants: vec![variant("v1", "p1", 1, 5)],
        }];
        let settings = Settings {
            out_of_stock_alert: false,
            ..Settings::default()
        };
        let alerts = derive_alerts(&products, &settings, &HashSet::new());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::LowStock);
    }

    #[test]
    fn test_cleared_acknowledgements() {
        let products = vec![ProductWithVariants {
            product: product("p1", 1, 5),
            variants: vec![variant("v1", "p1", 40, 5)],
        }];
        let acknowledged: HashSet<String> = ["low-stock-p1", "low-stock-variant-v1", "out-of-stock-p9"]
            .into_iter()
            .map(String::from)
            .collect();
        let alerts = derive_alerts(&products, &Settings::default(), &acknowledged);

        assert_eq!(
            cleared_acknowledgements(&alerts, &acknowledged),
            vec!["low-stock-variant-v1".to_string(), "out-of-stock-p9".to_string()]
        );
        assert!(cleared_acknowledgements(&alerts, &HashSet::new()).is_empty());
    }
}
