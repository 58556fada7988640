//! In-process ledger store
//!
//! Holds everything behind one `tokio::sync::Mutex`, so the compare-and-swap
//! check and the write happen under the same guard. Used by the engine tests
//! and handy for local experiments without PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use shared::ids::{generate_id, PRODUCT_PREFIX, SUPPLIER_PRICE_PREFIX, VARIANT_PREFIX};
use shared::{
    MovementFilter, Product, ProductVariant, SellingPriceHistory, StockMovement, StockTarget,
    SupplierPrice, SupplierPriceHistory, DEFAULT_MARGIN_PERCENT, DEFAULT_UNIT,
};

use super::{opening_stock_movement, CommitOutcome, LedgerCommit, LedgerStore, TargetState};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    products: HashMap<String, Product>,
    variants: HashMap<String, ProductVariant>,
    movements: Vec<StockMovement>,
    supplier_prices: HashMap<String, SupplierPrice>,
    selling_history: Vec<SellingPriceHistory>,
    supplier_history: Vec<SupplierPriceHistory>,
}

impl MemoryState {
    /// Quantity of a writable target; inactive products and foreign variants have none
    fn writable_quantity(&self, target: &StockTarget) -> Option<i64> {
        let product = self.products.get(&target.product_id).filter(|p| p.is_active)?;
        match &target.variant_id {
            None => Some(product.stock_quantity),
            Some(variant_id) => self
                .variants
                .get(variant_id)
                .filter(|v| v.product_id == product.id)
                .map(|v| v.stock_quantity),
        }
    }

    fn set_quantity(&mut self, target: &StockTarget, quantity: i64) {
        let now = Utc::now();
        match &target.variant_id {
            None => {
                if let Some(product) = self.products.get_mut(&target.product_id) {
                    product.stock_quantity = quantity;
                    product.updated_at = now;
                }
            }
            Some(variant_id) => {
                if let Some(variant) = self.variants.get_mut(variant_id) {
                    variant.stock_quantity = quantity;
                    variant.updated_at = now;
                }
            }
        }
    }

    fn owned_variant(&self, target: &StockTarget, variant_id: &str) -> AppResult<&ProductVariant> {
        let variant = self
            .variants
            .get(variant_id)
            .ok_or_else(|| AppError::NotFound("Variant".to_string()))?;
        if variant.product_id != target.product_id {
            return Err(AppError::validation(
                "variant_id",
                "Variant does not belong to product",
            ));
        }
        Ok(variant)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an active product. A positive opening stock is recorded as an
    /// adjustment, the same way the catalog does it.
    pub async fn add_product(&self, name: &str, opening_stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_id(Some(PRODUCT_PREFIX)),
            sku: None,
            barcode: None,
            name: name.to_string(),
            description: None,
            category_id: None,
            cost_price: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            margin_percent: Decimal::from(DEFAULT_MARGIN_PERCENT),
            tax_id: None,
            stock_quantity: opening_stock,
            stock_min: 0,
            stock_max: None,
            unit: DEFAULT_UNIT.to_string(),
            supplier_id: None,
            is_active: true,
            options: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.lock().await;
        if opening_stock > 0 {
            let target = StockTarget::product(product.id.clone());
            state
                .movements
                .push(opening_stock_movement(&target, opening_stock, None));
        }
        state.products.insert(product.id.clone(), product.clone());
        product
    }

    pub async fn add_variant(&self, product_id: &str, name: &str, opening_stock: i64) -> ProductVariant {
        let now = Utc::now();
        let variant = ProductVariant {
            id: generate_id(Some(VARIANT_PREFIX)),
            product_id: product_id.to_string(),
            name: name.to_string(),
            sku: None,
            barcode: None,
            cost_price: Decimal::ZERO,
            margin_percent: Decimal::from(DEFAULT_MARGIN_PERCENT),
            price: Decimal::ZERO,
            tax_id: None,
            stock_quantity: opening_stock,
            stock_min: 0,
            stock_max: None,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.lock().await;
        if opening_stock > 0 {
            let target = StockTarget::variant(product_id, variant.id.clone());
            state
                .movements
                .push(opening_stock_movement(&target, opening_stock, None));
        }
        state.variants.insert(variant.id.clone(), variant.clone());
        variant
    }

    pub async fn add_supplier_price(&self, product_id: &str, supplier_id: &str, price: Decimal) -> SupplierPrice {
        let now = Utc::now();
        let supplier_price = SupplierPrice {
            id: generate_id(Some(SUPPLIER_PRICE_PREFIX)),
            product_id: product_id.to_string(),
            supplier_id: supplier_id.to_string(),
            price,
            min_quantity: 1,
            lead_time_days: None,
            supplier_sku: None,
            purchase_url: None,
            is_preferred: false,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .await
            .supplier_prices
            .insert(supplier_price.id.clone(), supplier_price.clone());
        supplier_price
    }

    pub async fn set_product_active(&self, product_id: &str, active: bool) {
        if let Some(product) = self.state.lock().await.products.get_mut(product_id) {
            product.is_active = active;
        }
    }

    /// Overwrite a stored quantity without writing a movement.
    /// Simulates drift between the entity and its ledger.
    pub async fn overwrite_stock_quantity(&self, target: &StockTarget, quantity: i64) {
        self.state.lock().await.set_quantity(target, quantity);
    }

    pub async fn product(&self, id: &str) -> Option<Product> {
        self.state.lock().await.products.get(id).cloned()
    }

    pub async fn variant(&self, id: &str) -> Option<ProductVariant> {
        self.state.lock().await.variants.get(id).cloned()
    }

    pub async fn supplier_price(&self, id: &str) -> Option<SupplierPrice> {
        self.state.lock().await.supplier_prices.get(id).cloned()
    }

    /// Stored quantity of a target, active or not
    pub async fn stock_quantity(&self, target: &StockTarget) -> Option<i64> {
        let state = self.state.lock().await;
        match &target.variant_id {
            None => state.products.get(&target.product_id).map(|p| p.stock_quantity),
            Some(variant_id) => state.variants.get(variant_id).map(|v| v.stock_quantity),
        }
    }

    pub async fn movement_count(&self) -> usize {
        self.state.lock().await.movements.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load_target(&self, target: &StockTarget) -> AppResult<TargetState> {
        let state = self.state.lock().await;
        let product = state
            .products
            .get(&target.product_id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let (stock_quantity, cost_price) = match &target.variant_id {
            None => (product.stock_quantity, product.cost_price),
            Some(variant_id) => {
                let variant = state.owned_variant(target, variant_id)?;
                (variant.stock_quantity, variant.cost_price)
            }
        };

        Ok(TargetState {
            target: target.clone(),
            stock_quantity,
            cost_price,
            is_active: product.is_active,
        })
    }

    async fn commit(&self, commit: &LedgerCommit) -> AppResult<CommitOutcome> {
        let mut state = self.state.lock().await;

        for write in &commit.writes {
            if state.writable_quantity(&write.target) != Some(write.expected) {
                return Ok(CommitOutcome::Stale);
            }
        }
        for write in &commit.writes {
            state.set_quantity(&write.target, write.new_quantity);
        }
        state.movements.extend(commit.movements.iter().cloned());

        Ok(CommitOutcome::Committed)
    }

    async fn get_movement(&self, id: &str) -> AppResult<StockMovement> {
        self.state
            .lock()
            .await
            .movements
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    async fn list_movements(&self, filter: &MovementFilter) -> AppResult<Vec<StockMovement>> {
        let state = self.state.lock().await;
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);

        Ok(state
            .movements
            .iter()
            .rev()
            .filter(|m| filter.matches(m))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn target_history(&self, target: &StockTarget) -> AppResult<Vec<StockMovement>> {
        let state = self.state.lock().await;
        Ok(state
            .movements
            .iter()
            .filter(|m| m.product_id == target.product_id && m.variant_id == target.variant_id)
            .cloned()
            .collect())
    }

    async fn find_supplier_price(
        &self,
        product_id: &str,
        supplier_id: &str,
    ) -> AppResult<Option<SupplierPrice>> {
        let state = self.state.lock().await;
        Ok(state
            .supplier_prices
            .values()
            .find(|sp| sp.product_id == product_id && sp.supplier_id == supplier_id)
            .cloned())
    }

    async fn update_selling_price(&self, target: &StockTarget, price: Decimal) -> AppResult<Decimal> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        match &target.variant_id {
            None => {
                let product = state
                    .products
                    .get_mut(&target.product_id)
                    .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
                let old = product.selling_price;
                product.selling_price = price;
                product.updated_at = now;
                Ok(old)
            }
            Some(variant_id) => {
                state.owned_variant(target, variant_id)?;
                let variant = state
                    .variants
                    .get_mut(variant_id)
                    .ok_or_else(|| AppError::NotFound("Variant".to_string()))?;
                let old = variant.price;
                variant.price = price;
                variant.updated_at = now;
                Ok(old)
            }
        }
    }

    async fn update_supplier_price(
        &self,
        supplier_price_id: &str,
        price: Decimal,
    ) -> AppResult<Decimal> {
        let mut state = self.state.lock().await;
        let supplier_price = state
            .supplier_prices
            .get_mut(supplier_price_id)
            .ok_or_else(|| AppError::NotFound("Supplier price".to_string()))?;
        let old = supplier_price.price;
        supplier_price.price = price;
        supplier_price.updated_at = Utc::now();
        Ok(old)
    }

    async fn insert_selling_price_history(&self, entry: &SellingPriceHistory) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&entry.product_id) {
            return Err(AppError::NotFound("Product".to_string()));
        }
        if let Some(variant_id) = &entry.variant_id {
            if !state.variants.contains_key(variant_id) {
                return Err(AppError::NotFound("Variant".to_string()));
            }
        }
        state.selling_history.push(entry.clone());
        Ok(())
    }

    async fn insert_supplier_price_history(&self, entry: &SupplierPriceHistory) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.supplier_prices.contains_key(&entry.supplier_price_id) {
            return Err(AppError::NotFound("Supplier price".to_string()));
        }
        state.supplier_history.push(entry.clone());
        Ok(())
    }

    async fn selling_price_history(&self, target: &StockTarget) -> AppResult<Vec<SellingPriceHistory>> {
        let state = self.state.lock().await;
        Ok(state
            .selling_history
            .iter()
            .rev()
            .filter(|h| h.product_id == target.product_id && h.variant_id == target.variant_id)
            .cloned()
            .collect())
    }

    async fn supplier_price_history(
        &self,
        supplier_price_id: &str,
    ) -> AppResult<Vec<SupplierPriceHistory>> {
        let state = self.state.lock().await;
        Ok(state
            .supplier_history
            .iter()
            .rev()
            .filter(|h| h.supplier_price_id == supplier_price_id)
            .cloned()
            .collect())
    }
}
