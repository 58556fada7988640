//! Ledger exports

use serde::Serialize;

use shared::StockMovement;

use crate::error::{AppError, AppResult};

/// Flat CSV record of one movement
#[derive(Debug, Serialize)]
struct MovementRecord<'a> {
    id: &'a str,
    created_at: String,
    product_id: &'a str,
    variant_id: &'a str,
    #[serde(rename = "type")]
    movement_type: &'a str,
    quantity: i64,
    stock_before: i64,
    stock_after: i64,
    unit_cost: String,
    reference: &'a str,
    reason: &'a str,
    supplier_id: &'a str,
}

impl<'a> From<&'a StockMovement> for MovementRecord<'a> {
    fn from(m: &'a StockMovement) -> Self {
        Self {
            id: &m.id,
            created_at: m.created_at.to_rfc3339(),
            product_id: &m.product_id,
            variant_id: m.variant_id.as_deref().unwrap_or(""),
            movement_type: m.movement_type.as_str(),
            quantity: m.quantity,
            stock_before: m.stock_before,
            stock_after: m.stock_after,
            unit_cost: m.unit_cost.map(|c| c.to_string()).unwrap_or_default(),
            reference: m.reference.as_deref().unwrap_or(""),
            reason: m.reason.as_deref().unwrap_or(""),
            supplier_id: m.supplier_id.as_deref().unwrap_or(""),
        }
    }
}

pub struct ReportingService;

impl ReportingService {
    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }

    /// One row per movement, in the order given
    pub fn export_movements_csv(movements: &[StockMovement]) -> AppResult<String> {
        let records: Vec<MovementRecord<'_>> = movements.iter().map(MovementRecord::from).collect();
        Self::export_to_csv(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::MovementType;

    #[test]
    fn test_export_movements_csv() {
        let movement = StockMovement {
            id: "mov_1".to_string(),
            product_id: "prd_1".to_string(),
            variant_id: None,
            movement_type: MovementType::In,
            quantity: 12,
            stock_before: 3,
            stock_after: 15,
            unit_cost: Some(Decimal::new(450, 2)),
            reference: Some("PO-7".to_string()),
            reason: None,
            supplier_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap(),
        };

        let csv = ReportingService::export_movements_csv(&[movement]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,created_at,product_id,variant_id,type,quantity,stock_before,stock_after,unit_cost,reference,reason,supplier_id"
        );
        assert_eq!(
            lines.next().unwrap(),
            "mov_1,2026-05-04T08:00:00+00:00,prd_1,,in,12,3,15,4.50,PO-7,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_empty_ledger() {
        assert_eq!(ReportingService::export_movements_csv(&[]).unwrap(), "");
    }
}
