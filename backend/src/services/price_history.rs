//! Price history recorder
//!
//! History rows are an append-only log. `record_*` always appends, even for
//! a price equal to the last one; `change_*` is the edit path that writes the
//! new price and records it only when it differs from the old one.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use shared::ids::{generate_id, PRICE_HISTORY_PREFIX};
use shared::{validate_price, SellingPriceHistory, StockTarget, SupplierPriceHistory};

use crate::error::{check, AppResult};
use crate::store::LedgerStore;

/// Result of a price edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub old_price: Decimal,
    pub new_price: Decimal,
    /// Whether a history row was appended
    pub recorded: bool,
}

pub struct PriceHistoryRecorder<S> {
    store: Arc<S>,
}

impl<S> Clone for PriceHistoryRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> PriceHistoryRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append a selling price snapshot for a product or variant
    pub async fn record_selling_price_change(
        &self,
        target: &StockTarget,
        new_price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<SellingPriceHistory> {
        check("price", validate_price(new_price))?;

        let entry = SellingPriceHistory {
            id: generate_id(Some(PRICE_HISTORY_PREFIX)),
            product_id: target.product_id.clone(),
            variant_id: target.variant_id.clone(),
            price: new_price,
            created_at: Utc::now(),
            created_by: actor_id.map(str::to_string),
        };
        self.store.insert_selling_price_history(&entry).await?;

        tracing::debug!(stock_target = %target, price = %new_price, "Selling price recorded");
        Ok(entry)
    }

    /// Append a supplier price snapshot
    pub async fn record_supplier_price_change(
        &self,
        supplier_price_id: &str,
        new_price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<SupplierPriceHistory> {
        check("price", validate_price(new_price))?;

        let entry = SupplierPriceHistory {
            id: generate_id(Some(PRICE_HISTORY_PREFIX)),
            supplier_price_id: supplier_price_id.to_string(),
            price: new_price,
            created_at: Utc::now(),
            created_by: actor_id.map(str::to_string),
        };
        self.store.insert_supplier_price_history(&entry).await?;

        tracing::debug!(supplier_price_id, price = %new_price, "Supplier price recorded");
        Ok(entry)
    }

    /// Set a selling price and record it when it changed.
    ///
    /// The price update stands even when the history append fails.
    pub async fn change_selling_price(
        &self,
        target: &StockTarget,
        new_price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<PriceChange> {
        check("price", validate_price(new_price))?;

        let old_price = self.store.update_selling_price(target, new_price).await?;
        let mut recorded = false;
        if old_price != new_price {
            match self.record_selling_price_change(target, new_price, actor_id).await {
                Ok(_) => recorded = true,
                Err(e) => tracing::warn!(
                    stock_target = %target,
                    error = %e,
                    "Failed to record selling price history"
                ),
            }
        }

        Ok(PriceChange {
            old_price,
            new_price,
            recorded,
        })
    }

    /// Set a supplier price and record it when it changed
    pub async fn change_supplier_price(
        &self,
        supplier_price_id: &str,
        new_price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<PriceChange> {
        check("price", validate_price(new_price))?;

        let old_price = self
            .store
            .update_supplier_price(supplier_price_id, new_price)
            .await?;
        let mut recorded = false;
        if old_price != new_price {
            match self
                .record_supplier_price_change(supplier_price_id, new_price, actor_id)
                .await
            {
                Ok(_) => recorded = true,
                Err(e) => tracing::warn!(
                    supplier_price_id,
                    error = %e,
                    "Failed to record supplier price history"
                ),
            }
        }

        Ok(PriceChange {
            old_price,
            new_price,
            recorded,
        })
    }

    pub async fn selling_price_history(&self, target: &StockTarget) -> AppResult<Vec<SellingPriceHistory>> {
        self.store.selling_price_history(target).await
    }

    pub async fn supplier_price_history(
        &self,
        supplier_price_id: &str,
    ) -> AppResult<Vec<SupplierPriceHistory>> {
        self.store.supplier_price_history(supplier_price_id).await
    }
}
