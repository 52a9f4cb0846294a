//! # Domain Types
//!
//! Shared domain types for the transaction core: the catalog product
//! projection, the closed tender-type enum, and the operator/customer
//! references carried on ledger entries.
//!
//! ## Dual-Key Identity Pattern
//! Persisted entities carry a UUID `id` (immutable, used for relations).
//! Cart lines use a session-local integer id instead - they never outlive
//! the session.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Unit of Measure
// =============================================================================

/// How a product is measured and priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    /// Sold per unit; quantity is a whole number.
    Each,
    /// Sold by weight; price is per kilogram, quantity is captured in grams.
    Kilogram,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Owned by the external catalog; read-only to this core. The cart freezes
/// a snapshot of the fields it needs at the moment a line is created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Category this product belongs to (promotion applicability key).
    pub category_id: Option<String>,

    /// Price in cents. Per unit for `Each`, per kilogram for `Kilogram`.
    pub price_cents: i64,

    /// Unit of measure.
    pub unit: UnitOfMeasure,

    /// Whether the product is sold by weight (routes to weight capture,
    /// never a quantity stepper).
    pub is_weighted: bool,

    /// Current stock level, in the product's unit of measure
    /// (units for `Each`, grams for `Kilogram`).
    pub stock: i64,

    /// Stock level at which the product is flagged as low.
    pub min_stock: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the requested quantity (units or grams) can be sold
    /// from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock >= quantity
    }

    /// Checks if stock has fallen to or below the minimum level.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Payment Method (Tender Type)
// =============================================================================

/// Tender types accepted at the register.
///
/// A closed enum: the payment allocator and the register ledger match on it
/// exhaustively, so adding a method is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Instant bank transfer.
    Pix,
    /// Credit card, optionally in installments.
    Credit,
    /// Debit card.
    Debit,
    /// Store-extended credit against the customer's limit ("fiado"),
    /// repaid later on a due-date schedule.
    DeferredCredit,
}

impl PaymentMethod {
    /// Whether this method supports an installment schedule.
    #[inline]
    pub const fn is_installment_capable(&self) -> bool {
        matches!(self, PaymentMethod::Credit | PaymentMethod::DeferredCredit)
    }
}

// =============================================================================
// Day of Week
// =============================================================================

/// Day-of-week for promotion validity windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Maps a chrono weekday onto the wire enum.
    pub const fn from_chrono(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

// =============================================================================
// Customer Credit
// =============================================================================

/// The customer projection needed for deferred-credit eligibility.
///
/// Read from the external customer service; the allocator only ever sees
/// this narrow view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCredit {
    /// Customer identifier (UUID v4).
    pub customer_id: String,

    /// Maximum debt the store extends to this customer, in cents.
    pub credit_limit_cents: i64,

    /// Debt currently outstanding, in cents.
    pub current_debt_cents: i64,
}

impl CustomerCredit {
    /// Remaining headroom: `creditLimit − currentDebt`.
    #[inline]
    pub fn available(&self) -> Money {
        Money::from_cents(self.credit_limit_cents - self.current_debt_cents)
    }
}

// =============================================================================
// Operator
// =============================================================================

/// The operator performing a register transition or cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Test".to_string(),
            category_id: None,
            price_cents: 1000,
            unit: UnitOfMeasure::Each,
            is_weighted: false,
            stock,
            min_stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_sell() {
        let p = product(5, 2);
        assert!(p.can_sell(5));
        assert!(!p.can_sell(6));

        let mut inactive = product(5, 2);
        inactive.is_active = false;
        assert!(!inactive.can_sell(1));
    }

    #[test]
    fn test_low_stock() {
        assert!(product(2, 2).is_low_stock());
        assert!(!product(3, 2).is_low_stock());
    }

    #[test]
    fn test_installment_capable() {
        assert!(PaymentMethod::Credit.is_installment_capable());
        assert!(PaymentMethod::DeferredCredit.is_installment_capable());
        assert!(!PaymentMethod::Cash.is_installment_capable());
        assert!(!PaymentMethod::Pix.is_installment_capable());
        assert!(!PaymentMethod::Debit.is_installment_capable());
    }

    #[test]
    fn test_customer_credit_available() {
        let c = CustomerCredit {
            customer_id: "c-1".to_string(),
            credit_limit_cents: 50000,
            current_debt_cents: 12500,
        };
        assert_eq!(c.available().cents(), 37500);
    }

    #[test]
    fn test_day_of_week_from_chrono() {
        assert_eq!(DayOfWeek::from_chrono(Weekday::Mon), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from_chrono(Weekday::Sun), DayOfWeek::Sunday);
    }
}
