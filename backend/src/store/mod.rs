//! Entity store and movement ledger
//!
//! `LedgerStore` is the seam between the mutation engine and persistence.
//! Stock writes are compare-and-swap: a commit only lands when every target
//! still holds the quantity the engine read, otherwise it reports `Stale`
//! and nothing is written.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use shared::ids::{generate_id, MOVEMENT_PREFIX};
use shared::{
    MovementFilter, MovementType, SellingPriceHistory, StockMovement, StockTarget, SupplierPrice,
    SupplierPriceHistory,
};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;
pub(crate) mod rows;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const OPENING_STOCK_REASON: &str = "opening stock";

/// Current stock state of one target, as read before a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct TargetState {
    pub target: StockTarget,
    pub stock_quantity: i64,
    pub cost_price: Decimal,
    /// Activity of the owning product
    pub is_active: bool,
}

/// Expected and new quantity of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockWrite {
    pub target: StockTarget,
    pub expected: i64,
    pub new_quantity: i64,
}

/// Everything one mutation writes, applied as a single transaction
#[derive(Debug, Clone, Default)]
pub struct LedgerCommit {
    /// Sorted by target so concurrent commits lock rows in the same order
    pub writes: Vec<StockWrite>,
    pub movements: Vec<StockMovement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A target no longer holds its expected quantity
    Stale,
}

#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Resolve a target to its current stock.
    ///
    /// Fails with `NotFound` for an unknown product or variant and with a
    /// validation error for a variant owned by another product. Inactive
    /// products resolve; rejecting them is up to the caller.
    async fn load_target(&self, target: &StockTarget) -> AppResult<TargetState>;

    async fn commit(&self, commit: &LedgerCommit) -> AppResult<CommitOutcome>;

    async fn get_movement(&self, id: &str) -> AppResult<StockMovement>;

    /// Most recently committed first
    async fn list_movements(&self, filter: &MovementFilter) -> AppResult<Vec<StockMovement>>;

    /// Every movement of one target in the order it was written
    async fn target_history(&self, target: &StockTarget) -> AppResult<Vec<StockMovement>>;

    async fn find_supplier_price(
        &self,
        product_id: &str,
        supplier_id: &str,
    ) -> AppResult<Option<SupplierPrice>>;

    /// Set the selling price of a product or variant, returning the old price
    async fn update_selling_price(&self, target: &StockTarget, price: Decimal) -> AppResult<Decimal>;

    /// Set a supplier price, returning the old price
    async fn update_supplier_price(&self, supplier_price_id: &str, price: Decimal)
        -> AppResult<Decimal>;

    async fn insert_selling_price_history(&self, entry: &SellingPriceHistory) -> AppResult<()>;

    async fn insert_supplier_price_history(&self, entry: &SupplierPriceHistory) -> AppResult<()>;

    /// Newest first
    async fn selling_price_history(&self, target: &StockTarget) -> AppResult<Vec<SellingPriceHistory>>;

    /// Newest first
    async fn supplier_price_history(
        &self,
        supplier_price_id: &str,
    ) -> AppResult<Vec<SupplierPriceHistory>>;
}

/// The adjustment recorded when a product or variant is created with stock
pub fn opening_stock_movement(
    target: &StockTarget,
    quantity: i64,
    unit_cost: Option<Decimal>,
) -> StockMovement {
    StockMovement {
        id: generate_id(Some(MOVEMENT_PREFIX)),
        product_id: target.product_id.clone(),
        variant_id: target.variant_id.clone(),
        movement_type: MovementType::Adjustment,
        quantity,
        stock_before: 0,
        stock_after: quantity,
        unit_cost,
        reference: None,
        reason: Some(OPENING_STOCK_REASON.to_string()),
        supplier_id: None,
        created_at: Utc::now(),
    }
}
