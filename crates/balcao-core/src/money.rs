//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Split $100.00 into 3 installments of 33.333... and the cents       │
//! │  drift. OUR SOLUTION: integer cents.                                │
//! │    10000 cents / 3 = 3333 cents (×3 = 9999 cents)                   │
//! │    We KNOW the remainder is 1 cent, and assign it explicitly        │
//! │    (the last installment absorbs it - see the payment module).      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use balcao_core::money::Money;
//!
//! // Create from cents (there is no float constructor on purpose)
//! let price = Money::from_cents(1099); // $10.99
//!
//! let doubled = price * 2;
//! let total = price + Money::from_cents(500); // $15.99
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// - **i64 (signed)**: reconciliation differences and manual adjustments can
///   be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64, serializes
///   as a plain number
///
/// Every monetary value in the system - prices, discounts, payments,
/// register totals - flows through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    ///
    /// Used wherever an invariant requires a non-negative result, e.g.
    /// `effectiveSubtotal = max(0, originalSubtotal − effectiveDiscount)`.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Computes a percentage of this amount, expressed in basis points,
    /// rounded half-up.
    ///
    /// 1 basis point = 0.01%, so 1000 bps = 10%.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(20000); // $200.00
    /// let discount = subtotal.percent_of(1000); // 10%
    /// assert_eq!(discount.cents(), 2000); // $20.00
    /// ```
    pub fn percent_of(&self, bps: u32) -> Money {
        // i128 intermediate prevents overflow on large amounts
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies a per-kilogram price by a weight in grams, rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let per_kilo = Money::from_cents(1299); // $12.99/kg
    /// let subtotal = per_kilo.times_grams(485); // 0.485 kg
    /// assert_eq!(subtotal.cents(), 630); // $6.30
    /// ```
    pub fn times_grams(&self, grams: i64) -> Money {
        let cents = (self.0 as i128 * grams as i128 + 500) / 1000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for logs and tests. The UI layer formats for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_percent_of_exact() {
        // $200.00 at 10% = $20.00
        let subtotal = Money::from_cents(20000);
        assert_eq!(subtotal.percent_of(1000).cents(), 2000);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_of(825).cents(), 83);

        // $0.05 at 10% = $0.005 → $0.01
        let tiny = Money::from_cents(5);
        assert_eq!(tiny.percent_of(1000).cents(), 1);
    }

    #[test]
    fn test_times_grams() {
        // $12.99/kg × 485 g = $6.30 (6.30015 rounds down to the cent)
        let per_kilo = Money::from_cents(1299);
        assert_eq!(per_kilo.times_grams(485).cents(), 630);

        // $10.00/kg × 1500 g = $15.00
        let ten = Money::from_cents(1000);
        assert_eq!(ten.times_grams(1500).cents(), 1500);

        // $0.99/kg × 500 g = $0.495 → $0.50
        let cheap = Money::from_cents(99);
        assert_eq!(cheap.times_grams(500).cents(), 50);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-50).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(50).clamp_non_negative().cents(), 50);
        assert_eq!(Money::zero().clamp_non_negative().cents(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    /// Verifies that the division remainder is visible and explicit.
    /// The payment module assigns it to the last installment.
    #[test]
    fn test_division_precision_loss_documented() {
        let hundred = Money::from_cents(10000);
        let one_third = Money::from_cents(10000 / 3); // 3333 cents
        let reconstructed = one_third * 3; // 9999 cents

        let lost = hundred - reconstructed;
        assert_eq!(lost.cents(), 1);
    }
}
