//! Stock movement models
//!
//! A movement is one immutable record of a stock quantity change. The ledger
//! is the ordered history of all movements.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of movement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received (purchase, production)
    In,
    /// Goods leaving (sale, consumption)
    Out,
    /// Correction, carries a signed delta
    Adjustment,
    /// Leaving the source side of a transfer
    Transfer,
    /// Customer return
    Return,
}

impl MovementType {
    pub const ALL: [MovementType; 5] = [
        MovementType::In,
        MovementType::Out,
        MovementType::Adjustment,
        MovementType::Transfer,
        MovementType::Return,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
            MovementType::Transfer => "transfer",
            MovementType::Return => "return",
        }
    }

    /// Signed change applied to stock for a stored quantity.
    ///
    /// `quantity` is a magnitude for every type except `Adjustment`, where it
    /// is already signed.
    pub fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            MovementType::In | MovementType::Return => quantity,
            MovementType::Out | MovementType::Transfer => -quantity,
            MovementType::Adjustment => quantity,
        }
    }

    /// Direction bucket used by the daily movement chart
    pub fn direction(&self) -> Option<MovementDirection> {
        match self {
            MovementType::In | MovementType::Return => Some(MovementDirection::In),
            MovementType::Out | MovementType::Transfer => Some(MovementDirection::Out),
            MovementType::Adjustment => None,
        }
    }

    /// Whether a resulting negative stock is a business-rule rejection.
    /// Adjustments are the correction mechanism and are validated differently.
    pub fn checks_available_stock(&self) -> bool {
        !matches!(self, MovementType::Adjustment)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movement type: {0}")]
pub struct ParseMovementTypeError(pub String);

impl FromStr for MovementType {
    type Err = ParseMovementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "adjustment" => Ok(MovementType::Adjustment),
            "transfer" => Ok(MovementType::Transfer),
            "return" => Ok(MovementType::Return),
            other => Err(ParseMovementTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

/// A (product, variant) pair whose stock quantity is tracked independently
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockTarget {
    pub product_id: String,
    pub variant_id: Option<String>,
}

impl StockTarget {
    pub fn product(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: None,
        }
    }

    pub fn variant(product_id: impl Into<String>, variant_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: Some(variant_id.into()),
        }
    }
}

impl fmt::Display for StockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant_id {
            Some(variant_id) => write!(f, "{}/{}", self.product_id, variant_id),
            None => f.write_str(&self.product_id),
        }
    }
}

/// A persisted stock movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub unit_cost: Option<Decimal>,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub supplier_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn target(&self) -> StockTarget {
        StockTarget {
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
        }
    }

    pub fn signed_delta(&self) -> i64 {
        self.movement_type.signed_delta(self.quantity)
    }
}

/// A requested quantity change, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub supplier_id: Option<String>,
}

impl MovementRequest {
    pub fn new(target: StockTarget, movement_type: MovementType, quantity: i64) -> Self {
        Self {
            product_id: target.product_id,
            variant_id: target.variant_id,
            movement_type,
            quantity,
            unit_cost: None,
            reference: None,
            reason: None,
            supplier_id: None,
        }
    }

    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_supplier(mut self, supplier_id: impl Into<String>) -> Self {
        self.supplier_id = Some(supplier_id.into());
        self
    }

    pub fn target(&self) -> StockTarget {
        StockTarget {
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
        }
    }
}

/// Filter for ledger queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    /// With a product filter, include rows of every variant of the product
    #[serde(default)]
    pub all_variants: bool,
    #[serde(rename = "type")]
    pub movement_type: Option<MovementType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MovementFilter {
    pub fn for_target(target: &StockTarget) -> Self {
        Self {
            product_id: Some(target.product_id.clone()),
            variant_id: target.variant_id.clone(),
            ..Default::default()
        }
    }

    /// In-memory predicate, mirrors the SQL WHERE clause of the postgres store.
    /// A product filter without a variant matches the product's own rows only,
    /// unless `all_variants` is set.
    pub fn matches(&self, movement: &StockMovement) -> bool {
        if let Some(product_id) = &self.product_id {
            if &movement.product_id != product_id {
                return false;
            }
            if !self.all_variants && movement.variant_id != self.variant_id {
                return false;
            }
        }
        if let Some(movement_type) = self.movement_type {
            if movement.movement_type != movement_type {
                return false;
            }
        }
        if let Some(from) = self.from {
            if movement.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if movement.created_at > to {
                return false;
            }
        }
        true
    }
}

/// Result of replaying a target's movements from zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub target: StockTarget,
    pub movement_count: usize,
    pub replayed_quantity: i64,
    pub stored_quantity: i64,
    pub consistent: bool,
    /// Ids of movements whose stock_before differs from the previous stock_after
    pub chain_breaks: Vec<String>,
}

impl Reconciliation {
    /// Replay movements in chronological order against the stored quantity
    pub fn replay(target: StockTarget, movements: &[StockMovement], stored_quantity: i64) -> Self {
        let mut running = 0i64;
        let mut chain_breaks = Vec::new();

        for movement in movements {
            if movement.stock_before != running {
                chain_breaks.push(movement.id.clone());
            }
            running += movement.signed_delta();
            if movement.stock_after != running {
                // Delta and recorded snapshot disagree; realign on the snapshot
                // so one bad row is reported once.
                if chain_breaks.last() != Some(&movement.id) {
                    chain_breaks.push(movement.id.clone());
                }
                running = movement.stock_after;
            }
        }

        Self {
            target,
            movement_count: movements.len(),
            replayed_quantity: running,
            stored_quantity,
            consistent: chain_breaks.is_empty() && running == stored_quantity,
            chain_breaks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(id: &str, t: MovementType, quantity: i64, before: i64, after: i64) -> StockMovement {
        StockMovement {
            id: id.to_string(),
            product_id: "prd_1".to_string(),
            variant_id: None,
            movement_type: t,
            quantity,
            stock_before: before,
            stock_after: after,
            unit_cost: None,
            reference: None,
            reason: None,
            supplier_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(MovementType::In.signed_delta(4), 4);
        assert_eq!(MovementType::Return.signed_delta(4), 4);
        assert_eq!(MovementType::Out.signed_delta(4), -4);
        assert_eq!(MovementType::Transfer.signed_delta(4), -4);
        assert_eq!(MovementType::Adjustment.signed_delta(-3), -3);
    }

    #[test]
    fn test_parse_movement_type() {
        for t in MovementType::ALL {
            assert_eq!(t.as_str().parse::<MovementType>().unwrap(), t);
        }
        assert!("sale".parse::<MovementType>().is_err());
        assert!("IN".parse::<MovementType>().is_err());
    }

    #[test]
    fn test_serde_rejects_unknown_type() {
        let ok: Result<MovementType, _> = serde_json::from_str("\"return\"");
        assert_eq!(ok.unwrap(), MovementType::Return);
        let bad: Result<MovementType, _> = serde_json::from_str("\"shrinkage\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_adjustment_excluded_from_directions() {
        assert_eq!(MovementType::Adjustment.direction(), None);
        assert_eq!(MovementType::Return.direction(), Some(MovementDirection::In));
        assert_eq!(MovementType::Transfer.direction(), Some(MovementDirection::Out));
    }

    #[test]
    fn test_replay_consistent_chain() {
        let movements = vec![
            movement("m1", MovementType::In, 10, 0, 10),
            movement("m2", MovementType::Out, 3, 10, 7),
            movement("m3", MovementType::Adjustment, -7, 7, 0),
        ];
        let rec = Reconciliation::replay(StockTarget::product("prd_1"), &movements, 0);
        assert!(rec.consistent);
        assert_eq!(rec.replayed_quantity, 0);
        assert!(rec.chain_breaks.is_empty());
    }

    #[test]
    fn test_replay_detects_break_and_drift() {
        let movements = vec![
            movement("m1", MovementType::In, 10, 0, 10),
            movement("m2", MovementType::Out, 3, 9, 6),
        ];
        let rec = Reconciliation::replay(StockTarget::product("prd_1"), &movements, 6);
        assert!(!rec.consistent);
        assert_eq!(rec.chain_breaks, vec!["m2".to_string()]);

        let clean = vec![movement("m1", MovementType::In, 10, 0, 10)];
        let drift = Reconciliation::replay(StockTarget::product("prd_1"), &clean, 12);
        assert!(!drift.consistent);
        assert!(drift.chain_breaks.is_empty());
    }

    #[test]
    fn test_filter_matches_product_rows_only() {
        let mut m = movement("m1", MovementType::In, 1, 0, 1);
        let filter = MovementFilter::for_target(&StockTarget::product("prd_1"));
        assert!(filter.matches(&m));
        m.variant_id = Some("var_1".to_string());
        assert!(!filter.matches(&m));
        let variant_filter = MovementFilter::for_target(&StockTarget::variant("prd_1", "var_1"));
        assert!(variant_filter.matches(&m));
        let whole_product = MovementFilter {
            all_variants: true,
            ..filter
        };
        assert!(whole_product.matches(&m));
    }
}
