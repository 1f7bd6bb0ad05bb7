//! # Validation Module
//!
//! Field-level validators for incoming requests. Validation runs before
//! any transaction begins; the database's NOT NULL / CHECK / UNIQUE
//! constraints are the last line of defense behind these checks.

use crate::error::ValidationError;
use crate::{MAX_DISCOUNT_BPS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line quantity: positive and within the per-line cap.
///
/// The cap guards against fat-finger quantities (1000 instead of 10), not
/// against stock levels - stock is checked against the ledger inside the
/// sale transaction.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a discount expressed in basis points (0..=10000).
pub fn validate_discount_bps(discount_bps: u32) -> ValidationResult<()> {
    if discount_bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_bps".to_string(),
            min: 0,
            max: MAX_DISCOUNT_BPS as i64,
        });
    }
    Ok(())
}

/// Validates a monetary amount that must not be negative (payments,
/// sale-level discounts, physical counts).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an entity reference: non-empty after trimming.
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_discount_bounds() {
        assert!(validate_discount_bps(0).is_ok());
        assert!(validate_discount_bps(10_000).is_ok());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn test_non_negative_cents() {
        assert!(validate_non_negative_cents("amount_paid", 0).is_ok());
        assert!(validate_non_negative_cents("amount_paid", -1).is_err());
    }

    #[test]
    fn test_reference() {
        assert!(validate_reference("product_id", "p-1").is_ok());
        assert!(validate_reference("product_id", "  ").is_err());
    }
}
