//! # balcao-core: Pure Transaction Core for Balcão POS
//!
//! This crate is the **heart** of Balcão POS. It contains the transaction
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Balcão POS Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  UI layer (external consumer)               │   │
//! │  │    Catalog UI ──► Cart UI ──► Tender UI ──► Shift UI        │   │
//! │  └───────────────────────────┬─────────────────────────────────┘   │
//! │                              │                                      │
//! │  ┌───────────────────────────▼─────────────────────────────────┐   │
//! │  │                  balcao-session                             │   │
//! │  │    CheckoutSession, ShiftManager, ports to the backend      │   │
//! │  └───────────────────────────┬─────────────────────────────────┘   │
//! │                              │                                      │
//! │  ┌───────────────────────────▼─────────────────────────────────┐   │
//! │  │               ★ balcao-core (THIS CRATE) ★                  │   │
//! │  │                                                             │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌─────────┐ ┌──────────┐        │   │
//! │  │  │promotion │ │   cart   │ │ payment │ │ register │        │   │
//! │  │  │evaluator │ │  engine  │ │allocator│ │  ledger  │        │   │
//! │  │  └──────────┘ └──────────┘ └─────────┘ └──────────┘        │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS     │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents money type (no floating point)
//! - [`types`] - Domain types (Product, tender types, operator/customer refs)
//! - [`promotion`] - Promotion rule evaluator
//! - [`cart`] - Cart aggregation engine with explicit recomputation
//! - [`payment`] - Payment allocator / installment generator
//! - [`register`] - Cash register ledger state machine
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - timestamps come in as arguments
//! 2. **No I/O**: database, network, and clock access live in balcao-session
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **Explicit Errors**: all failures are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use balcao_core::money::Money;
//! use balcao_core::payment::generate_installments;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
//! let schedule = generate_installments(Money::from_cents(10000), 3, start, 30);
//!
//! // the schedule sums exactly to the parent amount
//! let sum: i64 = schedule.iter().map(|i| i.amount_cents).sum();
//! assert_eq!(sum, 10000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod payment;
pub mod promotion;
pub mod register;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use balcao_core::Money` instead of
// `use balcao_core::money::Money`

pub use cart::{CartEngine, CartLine, CartTotals, DiscountKind, ManualDiscount, Quantity};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{
    allocate, allocate_split, generate_installments, Installment, PaymentEntry, PaymentSpec,
};
pub use promotion::{evaluate, AppliedPromotion, LineContext, Promotion, PromotionKind};
pub use register::{
    CashMovement, CashMovementKind, CashRegister, ClosingSummary, RegisterStatus, TenderTotals,
};
pub use types::{CustomerCredit, DayOfWeek, Operator, PaymentMethod, Product, UnitOfMeasure};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum unit quantity of a single cart line.
///
/// Prevents accidental over-entry (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum weight accepted in a single weighing, in grams.
pub const MAX_WEIGHT_GRAMS: i64 = 100_000;

/// Maximum installment count for installment-capable tenders.
pub const MAX_INSTALLMENTS: i64 = 36;

/// Rate step a progressive promotion climbs per unit above its minimum
/// quantity, in basis points (2% per extra unit).
pub const PROGRESSIVE_STEP_BPS: i64 = 200;

/// Default rate ceiling for progressive promotions, in basis points (50%).
pub const DEFAULT_PROGRESSIVE_CAP_BPS: u32 = 5000;
