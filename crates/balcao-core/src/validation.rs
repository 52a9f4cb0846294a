//! # Validation Module
//!
//! Input validation for operator-entered values, run before business logic.
//! The UI layer does its own immediate feedback; these checks are the
//! authoritative layer.

use crate::cart::{DiscountKind, ManualDiscount};
use crate::error::ValidationError;
use crate::promotion::Promotion;
use crate::{MAX_INSTALLMENTS, MAX_LINE_QUANTITY, MAX_WEIGHT_GRAMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a captured weight in grams.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_WEIGHT_GRAMS (a single 100 kg weighing)
pub fn validate_weight_grams(grams: i64) -> ValidationResult<()> {
    if grams <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "weight".to_string(),
        });
    }

    if grams > MAX_WEIGHT_GRAMS {
        return Err(ValidationError::OutOfRange {
            field: "weight".to_string(),
            min: 1,
            max: MAX_WEIGHT_GRAMS,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents. Zero or negative amounts cannot
/// be paid.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash-movement amount in cents.
pub fn validate_movement_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates an installment count.
///
/// ## Rules
/// - At least 1
/// - Must not exceed MAX_INSTALLMENTS (36)
pub fn validate_installment_count(count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "installment count".to_string(),
        });
    }

    if count as i64 > MAX_INSTALLMENTS {
        return Err(ValidationError::OutOfRange {
            field: "installment count".to_string(),
            min: 1,
            max: MAX_INSTALLMENTS,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the free-text reason on a cash movement.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 200 characters
///
/// ## Returns
/// The trimmed reason string.
pub fn validate_movement_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 200,
        });
    }

    Ok(reason.to_string())
}

// =============================================================================
// Structured Validators
// =============================================================================

/// Validates a manual discount.
///
/// ## Rules
/// - Percent discounts are between 0 and 100% (10000 bps)
/// - Value discounts are non-negative
pub fn validate_discount(discount: &ManualDiscount) -> ValidationResult<()> {
    match discount.kind {
        DiscountKind::Percent => {
            if !(0..=10000).contains(&discount.amount) {
                return Err(ValidationError::OutOfRange {
                    field: "discount percent".to_string(),
                    min: 0,
                    max: 10000,
                });
            }
        }
        DiscountKind::Value => {
            if discount.amount < 0 {
                return Err(ValidationError::MustBePositive {
                    field: "discount value".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validates a promotion's validity window: the end must not precede the
/// start, for the date range and the optional time-of-day range alike.
pub fn validate_promotion_window(promotion: &Promotion) -> ValidationResult<()> {
    if promotion.end_date < promotion.start_date {
        return Err(ValidationError::InvalidFormat {
            field: "promotion window".to_string(),
            reason: "end date precedes start date".to_string(),
        });
    }

    if let (Some(start), Some(end)) = (promotion.start_time, promotion.end_time) {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "promotion window".to_string(),
                reason: "end time precedes start time".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::PromotionKind;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_weight_grams() {
        assert!(validate_weight_grams(1).is_ok());
        assert!(validate_weight_grams(100_000).is_ok());
        assert!(validate_weight_grams(0).is_err());
        assert!(validate_weight_grams(100_001).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-100).is_err());
    }

    #[test]
    fn test_validate_installment_count() {
        assert!(validate_installment_count(1).is_ok());
        assert!(validate_installment_count(36).is_ok());
        assert!(validate_installment_count(0).is_err());
        assert!(validate_installment_count(37).is_err());
    }

    #[test]
    fn test_validate_movement_reason_trims() {
        assert_eq!(
            validate_movement_reason("  Supplier payment  ").unwrap(),
            "Supplier payment"
        );
        assert!(validate_movement_reason("   ").is_err());
        assert!(validate_movement_reason(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_discount() {
        let ok = ManualDiscount {
            kind: DiscountKind::Percent,
            amount: 1500,
        };
        assert!(validate_discount(&ok).is_ok());

        let over = ManualDiscount {
            kind: DiscountKind::Percent,
            amount: 10001,
        };
        assert!(validate_discount(&over).is_err());

        let negative = ManualDiscount {
            kind: DiscountKind::Value,
            amount: -1,
        };
        assert!(validate_discount(&negative).is_err());
    }

    #[test]
    fn test_validate_promotion_window() {
        let mut promo = Promotion {
            id: "pr-1".to_string(),
            name: "Promo".to_string(),
            kind: PromotionKind::Percentage,
            value: 1000,
            buy_quantity: None,
            get_quantity: None,
            min_quantity: None,
            min_value_cents: None,
            max_discount_cents: None,
            max_rate_bps: None,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            start_time: None,
            end_time: None,
            days_of_week: None,
            product_ids: vec![],
            category_ids: vec![],
            priority: 0,
            is_cumulative: false,
            is_active: true,
        };
        assert!(validate_promotion_window(&promo).is_ok());

        promo.end_date = NaiveDate::from_ymd_opt(2026, 5, 31).unwrap();
        assert!(validate_promotion_window(&promo).is_err());

        promo.end_date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        promo.start_time = NaiveTime::from_hms_opt(18, 0, 0);
        promo.end_time = NaiveTime::from_hms_opt(17, 0, 0);
        assert!(validate_promotion_window(&promo).is_err());
    }
}
