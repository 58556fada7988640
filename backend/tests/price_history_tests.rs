//! Price history recorder tests
//!
//! - Every record call appends, identical calls included
//! - Negative prices are rejected before anything is written
//! - Price edits only append when the price actually changed

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::StockTarget;
use stock_ledger_backend::error::AppError;
use stock_ledger_backend::services::PriceHistoryRecorder;
use stock_ledger_backend::store::{LedgerStore, MemoryStore};

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_selling_price_calls_append_twice() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Latte glass", 0).await;
        let target = StockTarget::product(&product.id);
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        recorder
            .record_selling_price_change(&target, dec(1250), Some("usr_1"))
            .await
            .unwrap();
        recorder
            .record_selling_price_change(&target, dec(1250), Some("usr_1"))
            .await
            .unwrap();

        let history = recorder.selling_price_history(&target).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|h| h.price == dec(1250)));
        assert!(history.iter().all(|h| h.created_by.as_deref() == Some("usr_1")));
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Saucer", 0).await;
        let target = StockTarget::product(&product.id);
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        let err = recorder
            .record_selling_price_change(&target, dec(-1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "price"));
        assert!(recorder.selling_price_history(&target).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        let err = recorder
            .record_selling_price_change(&StockTarget::product("prd_missing"), dec(100), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_change_selling_price_records_only_on_change() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Tumbler", 0).await;
        let target = StockTarget::product(&product.id);
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        let first = recorder
            .change_selling_price(&target, dec(900), None)
            .await
            .unwrap();
        assert_eq!(first.old_price, Decimal::ZERO);
        assert!(first.recorded);

        let unchanged = recorder
            .change_selling_price(&target, dec(900), None)
            .await
            .unwrap();
        assert!(!unchanged.recorded);

        assert_eq!(store.product(&product.id).await.unwrap().selling_price, dec(900));
        assert_eq!(recorder.selling_price_history(&target).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_variant_history_is_separate_from_product_history() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Hoodie", 0).await;
        let variant = store.add_variant(&product.id, "Medium", 0).await;
        let variant_target = StockTarget::variant(&product.id, &variant.id);
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        recorder
            .change_selling_price(&variant_target, dec(3500), None)
            .await
            .unwrap();

        assert_eq!(store.variant(&variant.id).await.unwrap().price, dec(3500));
        assert_eq!(
            recorder.selling_price_history(&variant_target).await.unwrap().len(),
            1
        );
        assert!(recorder
            .selling_price_history(&StockTarget::product(&product.id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Pitcher", 0).await;
        let target = StockTarget::product(&product.id);
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        for cents in [100, 200, 300] {
            recorder.change_selling_price(&target, dec(cents), None).await.unwrap();
        }

        let prices: Vec<Decimal> = recorder
            .selling_price_history(&target)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.price)
            .collect();
        assert_eq!(prices, vec![dec(300), dec(200), dec(100)]);
    }

    #[tokio::test]
    async fn test_supplier_price_change_updates_and_records() {
        let store = Arc::new(MemoryStore::new());
        let product = store.add_product("Syrup", 0).await;
        let quote = store.add_supplier_price(&product.id, "sup_1", dec(250)).await;
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        let change = recorder
            .change_supplier_price(&quote.id, dec(275), Some("usr_2"))
            .await
            .unwrap();

        assert_eq!(change.old_price, dec(250));
        assert!(change.recorded);
        assert_eq!(store.supplier_price(&quote.id).await.unwrap().price, dec(275));

        let history = store.supplier_price_history(&quote.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].created_by.as_deref(), Some("usr_2"));
    }

    #[tokio::test]
    async fn test_unknown_supplier_price_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

        let err = recorder
            .change_supplier_price("spr_missing", dec(100), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// One history row per record call, regardless of the values
        #[test]
        fn prop_every_record_call_appends(prices in prop::collection::vec(0i64..100_000, 1..15)) {
            let count = tokio_test::block_on(async {
                let store = Arc::new(MemoryStore::new());
                let product = store.add_product("Property", 0).await;
                let target = StockTarget::product(&product.id);
                let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

                for cents in &prices {
                    recorder
                        .record_selling_price_change(&target, dec(*cents), None)
                        .await
                        .unwrap();
                }
                recorder.selling_price_history(&target).await.unwrap().len()
            });

            prop_assert_eq!(count, prices.len());
        }

        /// Negative prices never reach the history
        #[test]
        fn prop_negative_prices_rejected(cents in -100_000i64..0) {
            let (rejected, rows) = tokio_test::block_on(async {
                let store = Arc::new(MemoryStore::new());
                let product = store.add_product("Property", 0).await;
                let target = StockTarget::product(&product.id);
                let recorder = PriceHistoryRecorder::new(Arc::clone(&store));

                let rejected = recorder
                    .change_selling_price(&target, dec(cents), None)
                    .await
                    .is_err();
                let rows = recorder.selling_price_history(&target).await.unwrap().len();
                (rejected, rows)
            });

            prop_assert!(rejected);
            prop_assert_eq!(rows, 0);
        }
    }
}
