//! Stock status and valuation projector tests
//!
//! - Status classification precedence
//! - Valuation rounds the aggregate, not each line
//! - Daily chart window always has one bucket per day
//! - Dashboard stats over a catalog snapshot

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::ids::generate_id;
use shared::{
    aggregate_movements_by_day, classify_stock, stock_value, total_stock_value, Currency,
    MovementType, Product, ProductVariant, ProductWithVariants, StockMovement, StockStatus,
};
use stock_ledger_backend::services::dashboard::build_stats;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(name: &str, cost: &str, quantity: i64, min: i64, max: Option<i64>) -> Product {
    let now = Utc::now();
    Product {
        id: generate_id(Some("prd")),
        sku: None,
        barcode: None,
        name: name.to_string(),
        description: None,
        category_id: None,
        cost_price: dec(cost),
        selling_price: Decimal::ZERO,
        margin_percent: Decimal::from(30),
        tax_id: None,
        stock_quantity: quantity,
        stock_min: min,
        stock_max: max,
        unit: "unit".to_string(),
        supplier_id: None,
        is_active: true,
        options: None,
        created_at: now,
        updated_at: now,
    }
}

fn variant(product: &Product, name: &str, cost: &str, quantity: i64, min: i64) -> ProductVariant {
    let now = Utc::now();
    ProductVariant {
        id: generate_id(Some("var")),
        product_id: product.id.clone(),
        name: name.to_string(),
        sku: None,
        barcode: None,
        cost_price: dec(cost),
        margin_percent: Decimal::from(30),
        price: Decimal::ZERO,
        tax_id: None,
        stock_quantity: quantity,
        stock_min: min,
        stock_max: None,
        supplier_id: None,
        created_at: now,
        updated_at: now,
    }
}

fn movement_on(day: NaiveDate, movement_type: MovementType, quantity: i64) -> StockMovement {
    StockMovement {
        id: generate_id(Some("mov")),
        product_id: "prd_1".to_string(),
        variant_id: None,
        movement_type,
        quantity,
        stock_before: 0,
        stock_after: 0,
        unit_cost: None,
        reference: None,
        reason: None,
        supplier_id: None,
        created_at: Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_classification_examples() {
        assert_eq!(classify_stock(0, 5, None), StockStatus::OutOfStock);
        assert_eq!(classify_stock(5, 5, None), StockStatus::LowStock);
        assert_eq!(classify_stock(10, 5, Some(8)), StockStatus::Overstock);
        assert_eq!(classify_stock(6, 5, Some(10)), StockStatus::Normal);
    }

    #[test]
    fn test_out_of_stock_wins_with_zero_threshold() {
        assert_eq!(classify_stock(0, 0, Some(0)), StockStatus::OutOfStock);
    }

    #[test]
    fn test_line_value() {
        assert_eq!(stock_value(dec("12.5"), 4), dec("50.00"));
    }

    #[test]
    fn test_aggregate_rounds_once() {
        let total = total_stock_value(vec![(dec("10"), 3), (dec("7.333"), 2)]);
        assert_eq!(total, dec("44.67"));

        // Rounding per line would give 0.03
        let drifting = vec![(dec("0.005"), 1), (dec("0.005"), 1), (dec("0.005"), 1)];
        assert_eq!(total_stock_value(drifting), dec("0.02"));
    }

    #[test]
    fn test_empty_chart_window_has_fourteen_buckets() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let chart = aggregate_movements_by_day(&[], 14, today);

        assert_eq!(chart.labels.len(), 14);
        assert_eq!(chart.stock_in, vec![0; 14]);
        assert_eq!(chart.stock_out, vec![0; 14]);
        assert_eq!(chart.labels.last().map(String::as_str), Some("Mar 14"));
    }

    #[test]
    fn test_chart_buckets_by_direction() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let movements = vec![
            movement_on(today, MovementType::In, 10),
            movement_on(today, MovementType::Return, 2),
            movement_on(today, MovementType::Out, 4),
            movement_on(today, MovementType::Transfer, 1),
            movement_on(today, MovementType::Adjustment, -3),
            movement_on(today - Duration::days(30), MovementType::In, 99),
        ];

        let chart = aggregate_movements_by_day(&movements, 14, today);
        assert_eq!(chart.stock_in[13], 12);
        assert_eq!(chart.stock_out[13], 5);
        assert_eq!(chart.stock_in.iter().sum::<i64>(), 12);
    }

    #[test]
    fn test_build_stats_over_catalog() {
        let beans = product("Beans", "8.00", 20, 5, None);
        let cups = product("Cups", "0.50", 3, 10, None);
        let filters = product("Filters", "2.00", 0, 5, None);
        let shirt = product("Shirt", "0", 0, 0, None);
        let large = variant(&shirt, "Large", "12.00", 2, 4);
        let small = variant(&shirt, "Small", "12.00", 6, 4);

        let catalog = vec![
            ProductWithVariants { product: beans, variants: vec![] },
            ProductWithVariants { product: cups, variants: vec![] },
            ProductWithVariants { product: filters, variants: vec![] },
            ProductWithVariants { product: shirt, variants: vec![large, small] },
        ];

        let stats = build_stats(&catalog, Currency::Eur, 10, 2);

        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.total_variants, 2);
        // 160 + 1.5 + 0 + 0 + 24 + 72
        assert_eq!(stats.total_stock_value, dec("257.50"));
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.out_of_stock_count, 2);

        let low: Vec<&str> = stats.low_stock_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(low, vec!["Filters", "Shirt", "Shirt - Large", "Cups"]);

        let top: Vec<&str> = stats.top_items_by_value.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(top, vec!["Beans", "Shirt - Small"]);
    }

    #[test]
    fn test_build_stats_truncates_low_stock_list() {
        let catalog: Vec<ProductWithVariants> = (0..8)
            .map(|i| ProductWithVariants {
                product: product(&format!("Item {i}"), "1", i, 10, None),
                variants: vec![],
            })
            .collect();

        let stats = build_stats(&catalog, Currency::Usd, 5, 5);
        assert_eq!(stats.low_stock_items.len(), 5);
        assert_eq!(stats.low_stock_count + stats.out_of_stock_count, 8);
        assert_eq!(stats.currency, Currency::Usd);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000, 0u32..4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Zero or negative quantity is always out of stock
        #[test]
        fn prop_non_positive_is_out_of_stock(
            quantity in -100i64..=0,
            min in 0i64..100,
            max in proptest::option::of(0i64..200)
        ) {
            prop_assert_eq!(classify_stock(quantity, min, max), StockStatus::OutOfStock);
        }

        /// Low stock means positive and at or below the minimum
        #[test]
        fn prop_low_stock_bounds(quantity in 1i64..500, min in 0i64..500) {
            let status = classify_stock(quantity, min, None);
            prop_assert_eq!(status == StockStatus::LowStock, quantity <= min);
        }

        /// Line value is cost times quantity to two decimals
        #[test]
        fn prop_stock_value_scale(cost in cost_strategy(), quantity in 0i64..10_000) {
            let value = stock_value(cost, quantity);
            prop_assert!(value.scale() <= 2);
            prop_assert!((value - cost * Decimal::from(quantity)).abs() <= dec("0.005"));
        }

        /// Aggregate valuation stays within half a cent of the exact sum
        #[test]
        fn prop_total_value_rounds_final_sum(
            lines in prop::collection::vec((cost_strategy(), 0i64..1_000), 0..20)
        ) {
            let exact: Decimal = lines.iter().map(|(c, q)| *c * Decimal::from(*q)).sum();
            let total = total_stock_value(lines);
            prop_assert!((total - exact).abs() <= dec("0.005"));
        }

        /// The chart always has one label and one value pair per day
        #[test]
        fn prop_chart_has_one_bucket_per_day(
            window in 1u32..60,
            offsets in prop::collection::vec(0i64..90, 0..40)
        ) {
            let today = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
            let movements: Vec<StockMovement> = offsets
                .iter()
                .map(|o| movement_on(today - Duration::days(*o), MovementType::In, 1))
                .collect();

            let chart = aggregate_movements_by_day(&movements, window, today);
            prop_assert_eq!(chart.labels.len(), window as usize);
            prop_assert_eq!(chart.stock_in.len(), window as usize);
            prop_assert_eq!(chart.stock_out.len(), window as usize);

            let in_window = offsets.iter().filter(|o| **o < i64::from(window)).count() as i64;
            prop_assert_eq!(chart.stock_in.iter().sum::<i64>(), in_window);
        }
    }
}
