//! Validation utilities for the stock ledger
//!
//! Plain checks return `Result<(), &'static str>`; the backend lifts them into
//! its error type. `validate_not_negative` is the `validator` custom hook used
//! by the input models.

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::MovementType;

// ============================================================================
// Movement Validations
// ============================================================================

/// Validate a requested quantity for its movement type.
/// Adjustments carry a signed, non-zero delta; every other type a positive magnitude.
pub fn validate_movement_quantity(movement_type: MovementType, quantity: i64) -> Result<(), &'static str> {
    match movement_type {
        MovementType::Adjustment if quantity == 0 => Err("Adjustment quantity must be non-zero"),
        MovementType::Adjustment => Ok(()),
        _ if quantity <= 0 => Err("Quantity must be positive"),
        _ => Ok(()),
    }
}

/// Validate an absolute stock level
pub fn validate_stock_level(level: i64) -> Result<(), &'static str> {
    if level < 0 {
        return Err("Stock level cannot be negative");
    }
    Ok(())
}

/// Validate min/max thresholds: both non-negative, max not below min
pub fn validate_thresholds(stock_min: i64, stock_max: Option<i64>) -> Result<(), &'static str> {
    if stock_min < 0 {
        return Err("Minimum stock cannot be negative");
    }
    if let Some(max) = stock_max {
        if max < stock_min {
            return Err("Maximum stock must be greater than or equal to minimum stock");
        }
    }
    Ok(())
}

// ============================================================================
// Price Validations
// ============================================================================

/// Validate a price or cost value
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate a margin percentage (0-1000%)
pub fn validate_margin_percent(margin: Decimal) -> Result<(), &'static str> {
    if margin < Decimal::ZERO || margin > Decimal::from(1000) {
        return Err("Margin must be between 0 and 1000%");
    }
    Ok(())
}

/// `validator` custom hook for money fields
pub fn validate_not_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate SKU format: 1-64 chars of letters, digits, '-', '_' or '.'
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() {
        return Err("SKU cannot be empty");
    }
    if sku.len() > 64 {
        return Err("SKU must be at most 64 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err("SKU may only contain letters, digits, '-', '_' and '.'");
    }
    Ok(())
}

/// Validate a hex color like `#6B7280`
pub fn validate_hex_color(color: &str) -> Result<(), &'static str> {
    let hex = color.strip_prefix('#').ok_or("Color must start with '#'")?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Color must be a 6-digit hex value");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_movement_quantity_positive_magnitude() {
        assert!(validate_movement_quantity(MovementType::In, 1).is_ok());
        assert!(validate_movement_quantity(MovementType::Out, 0).is_err());
        assert!(validate_movement_quantity(MovementType::Return, -2).is_err());
        assert!(validate_movement_quantity(MovementType::Transfer, -1).is_err());
    }

    #[test]
    fn test_adjustment_quantity_signed() {
        assert!(validate_movement_quantity(MovementType::Adjustment, -4).is_ok());
        assert!(validate_movement_quantity(MovementType::Adjustment, 4).is_ok());
        assert!(validate_movement_quantity(MovementType::Adjustment, 0).is_err());
    }

    #[test]
    fn test_thresholds() {
        assert!(validate_thresholds(0, None).is_ok());
        assert!(validate_thresholds(5, Some(5)).is_ok());
        assert!(validate_thresholds(5, Some(4)).is_err());
        assert!(validate_thresholds(-1, None).is_err());
    }

    #[test]
    fn test_stock_level() {
        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(-1).is_err());
    }

    #[test]
    fn test_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from_str("19.99").unwrap()).is_ok());
        assert!(validate_price(Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_not_negative_hook() {
        assert!(validate_not_negative(&Decimal::from(3)).is_ok());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::from(-3)).is_err());
    }

    #[test]
    fn test_margin() {
        assert!(validate_margin_percent(Decimal::from(30)).is_ok());
        assert!(validate_margin_percent(Decimal::from(-1)).is_err());
        assert!(validate_margin_percent(Decimal::from(1001)).is_err());
    }

    #[test]
    fn test_sku() {
        assert!(validate_sku("TSHIRT-RED_L.2").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(validate_hex_color("#6B7280").is_ok());
        assert!(validate_hex_color("6B7280").is_err());
        assert!(validate_hex_color("#6B72").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }
}
