//! # Error Types
//!
//! Domain-specific error types for balcao-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  balcao-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule and state-machine violations  │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  balcao-session errors (separate crate)                             │
//! │  ├── PortError        - External collaborator failures              │
//! │  └── SessionError     - What the UI layer sees                      │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → SessionError → UI              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every error is recoverable at the call site - the operator corrects
//!    the input and retries; nothing here is fatal to the process

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Transaction-core errors.
///
/// Register state violations (`RegisterNotOpen`, `RegisterAlreadyClosed`)
/// are programming-contract violations: the caller must check the register
/// status before invoking a transition. They are never retried automatically.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart line id does not exist in the current cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(u64),

    /// A weighted product was used where a unit quantity is required,
    /// or a unit quantity operation was attempted on a weighted line.
    /// Weighted products go through weight capture, never a quantity stepper.
    #[error("Product {product_id} is sold by weight, weight capture required")]
    WeightRequired { product_id: String },

    /// A weight was supplied for a product sold by unit.
    #[error("Product {product_id} is not sold by weight")]
    NotWeighted { product_id: String },

    /// Insufficient stock to add the requested quantity.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded the maximum allowed number of lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Customer's deferred-credit headroom does not cover the sale total.
    ///
    /// This is a hard precondition, not a warning: the allocation is
    /// rejected outright when `creditLimit − currentDebt < total`.
    #[error("Insufficient credit: available {available} cents, requested {requested} cents")]
    InsufficientCredit { available: i64, requested: i64 },

    /// Cash received is less than the amount due.
    #[error("Cash received {received} cents is less than total {total} cents")]
    CashReceivedShort { received: i64, total: i64 },

    /// Split-payment entries do not sum to the sale total.
    ///
    /// No partial or short payment is accepted as "complete".
    #[error("Split payments sum to {paid} cents, sale total is {total} cents")]
    SplitTotalMismatch { paid: i64, total: i64 },

    /// A register transition was attempted while no register is open.
    #[error("Register is not open")]
    RegisterNotOpen,

    /// `close()` was attempted on a register that is already closed.
    #[error("Register is already closed")]
    RegisterAlreadyClosed,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input does not meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format or inconsistent value pair (e.g. window end before start).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientCredit {
            available: 5000,
            requested: 7500,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient credit: available 5000 cents, requested 7500 cents"
        );

        let err = CoreError::SplitTotalMismatch {
            paid: 9900,
            total: 10000,
        };
        assert_eq!(
            err.to_string(),
            "Split payments sum to 9900 cents, sale total is 10000 cents"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "reason".to_string(),
        };
        assert_eq!(err.to_string(), "reason is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
