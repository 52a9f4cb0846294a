//! # Cash Register Ledger
//!
//! Per-shift state machine tracking the opening float, accumulated sales by
//! tender type, manual withdrawals/deposits, and the closing reconciliation
//! against a physically counted amount.
//!
//! ## Lifecycle
//! ```text
//! ┌────────┐   open(float)    ┌────────┐   close(counted)   ┌────────┐
//! │ (none) │ ───────────────► │  OPEN  │ ─────────────────► │ CLOSED │
//! └────────┘                  └────────┘                    └────────┘
//!                              │  ▲                          frozen:
//!                   post_sale ─┘  │                          no postSale,
//!                   withdraw ─────┤                          no withdraw,
//!                   deposit ──────┘                          no deposit
//!
//! expectedCash = openingBalance + cashSales + deposits − withdrawals
//! difference   = countedCash − expectedCash    (signed, informational)
//! ```
//!
//! A transition attempted from the wrong state is a programming-contract
//! violation and is rejected with a typed error - never retried. The
//! difference never blocks a close: over and short shifts are both allowed,
//! merely flagged for the operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::PaymentEntry;
use crate::types::{Operator, PaymentMethod};
use crate::validation::{validate_movement_amount, validate_movement_reason};

// =============================================================================
// Suggestion Lists
// =============================================================================

/// Reasons suggested to the operator for a withdrawal. Free text is still
/// accepted; these seed the UI dropdown.
pub const WITHDRAWAL_REASONS: &[&str] = &[
    "Supplier payment",
    "Cash transfer to safe",
    "Change fund for another register",
    "Operational expense",
];

/// Reasons suggested to the operator for a deposit.
pub const DEPOSIT_REASONS: &[&str] = &[
    "Change fund reinforcement",
    "Cash return from safe",
    "Correction of previous movement",
];

// =============================================================================
// Status & Movements
// =============================================================================

/// Register lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Open,
    Closed,
}

/// Direction of a manual cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    Withdrawal,
    Deposit,
}

/// A manual withdrawal from or deposit into the register drawer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub kind: CashMovementKind,
    pub amount_cents: i64,
    pub reason: String,
    pub operator: Operator,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
}

impl CashMovement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Tender Totals
// =============================================================================

/// Running totals per tender type.
///
/// The cash column is seeded with the opening float, so at any moment it
/// reads `openingBalance + cashSales`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderTotals {
    pub cash_cents: i64,
    pub pix_cents: i64,
    pub credit_cents: i64,
    pub debit_cents: i64,
    pub deferred_cents: i64,
}

impl TenderTotals {
    fn add(&mut self, method: PaymentMethod, amount_cents: i64) {
        match method {
            PaymentMethod::Cash => self.cash_cents += amount_cents,
            PaymentMethod::Pix => self.pix_cents += amount_cents,
            PaymentMethod::Credit => self.credit_cents += amount_cents,
            PaymentMethod::Debit => self.debit_cents += amount_cents,
            PaymentMethod::DeferredCredit => self.deferred_cents += amount_cents,
        }
    }

    pub fn for_method(&self, method: PaymentMethod) -> Money {
        let cents = match method {
            PaymentMethod::Cash => self.cash_cents,
            PaymentMethod::Pix => self.pix_cents,
            PaymentMethod::Credit => self.credit_cents,
            PaymentMethod::Debit => self.debit_cents,
            PaymentMethod::DeferredCredit => self.deferred_cents,
        };
        Money::from_cents(cents)
    }
}

// =============================================================================
// Closing Summary
// =============================================================================

/// The reconciliation result handed back to the operator at close.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClosingSummary {
    pub expected_cents: i64,
    pub counted_cents: i64,
    /// `counted − expected`. Negative means the drawer is short.
    pub difference_cents: i64,
}

// =============================================================================
// Cash Register
// =============================================================================

/// One register instance per shift. A new `open` creates a fresh instance
/// with a strictly increasing shift number; `close` freezes it for good.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashRegister {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Strictly increasing per store.
    pub shift_number: i64,

    /// The float seeded into the drawer at open.
    pub opening_balance_cents: i64,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opened_by: Operator,

    /// Running totals per tender type (cash column includes the float).
    pub tender_totals: TenderTotals,

    /// Total of all posted sales, across tender types.
    pub total_sales_cents: i64,

    /// Number of posted sales.
    pub sale_count: i64,

    /// Withdrawals and deposits, in posting order.
    pub movements: Vec<CashMovement>,

    pub status: RegisterStatus,

    /// Physically counted cash at close.
    pub counted_cents: Option<i64>,

    /// Expected cash at close.
    pub expected_cents: Option<i64>,

    /// `counted − expected`, signed. Informational only.
    pub difference_cents: Option<i64>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Operator>,
}

impl CashRegister {
    /// Opens a fresh register for a new shift, seeding the cash column with
    /// the opening float.
    pub fn open(
        shift_number: i64,
        opening_balance: Money,
        operator: Operator,
        at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if opening_balance.is_negative() {
            return Err(crate::error::ValidationError::MustBePositive {
                field: "opening balance".to_string(),
            }
            .into());
        }

        Ok(CashRegister {
            id: Uuid::new_v4().to_string(),
            shift_number,
            opening_balance_cents: opening_balance.cents(),
            opened_at: at,
            opened_by: operator,
            tender_totals: TenderTotals {
                cash_cents: opening_balance.cents(),
                ..TenderTotals::default()
            },
            total_sales_cents: 0,
            sale_count: 0,
            movements: Vec::new(),
            status: RegisterStatus::Open,
            counted_cents: None,
            expected_cents: None,
            difference_cents: None,
            closed_at: None,
            closed_by: None,
        })
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::RegisterNotOpen)
        }
    }

    /// Posts a confirmed sale: each payment leg is added to its tender-type
    /// running total and to the sales total.
    pub fn post_sale(&mut self, entries: &[PaymentEntry]) -> CoreResult<()> {
        self.ensure_open()?;
        for entry in entries {
            self.tender_totals.add(entry.method, entry.amount_cents);
            self.total_sales_cents += entry.amount_cents;
        }
        self.sale_count += 1;
        Ok(())
    }

    /// Records a manual withdrawal from the drawer.
    pub fn withdraw(
        &mut self,
        amount: Money,
        reason: &str,
        operator: Operator,
        at: DateTime<Utc>,
    ) -> CoreResult<CashMovement> {
        self.push_movement(CashMovementKind::Withdrawal, amount, reason, operator, at)
    }

    /// Records a manual deposit into the drawer.
    pub fn deposit(
        &mut self,
        amount: Money,
        reason: &str,
        operator: Operator,
        at: DateTime<Utc>,
    ) -> CoreResult<CashMovement> {
        self.push_movement(CashMovementKind::Deposit, amount, reason, operator, at)
    }

    fn push_movement(
        &mut self,
        kind: CashMovementKind,
        amount: Money,
        reason: &str,
        operator: Operator,
        at: DateTime<Utc>,
    ) -> CoreResult<CashMovement> {
        self.ensure_open()?;
        validate_movement_amount(amount.cents())?;
        let reason = validate_movement_reason(reason)?;

        let movement = CashMovement {
            id: Uuid::new_v4().to_string(),
            kind,
            amount_cents: amount.cents(),
            reason,
            operator,
            at,
        };
        self.movements.push(movement.clone());
        Ok(movement)
    }

    /// Sum of all withdrawals.
    pub fn withdrawals_total(&self) -> Money {
        self.movements_total(CashMovementKind::Withdrawal)
    }

    /// Sum of all deposits.
    pub fn deposits_total(&self) -> Money {
        self.movements_total(CashMovementKind::Deposit)
    }

    fn movements_total(&self, kind: CashMovementKind) -> Money {
        Money::from_cents(
            self.movements
                .iter()
                .filter(|m| m.kind == kind)
                .map(|m| m.amount_cents)
                .sum(),
        )
    }

    /// Cash sales accumulated this shift (cash column minus the float).
    pub fn cash_sales_total(&self) -> Money {
        Money::from_cents(self.tender_totals.cash_cents - self.opening_balance_cents)
    }

    /// What the drawer should hold right now:
    /// `openingBalance + cashSales + deposits − withdrawals`.
    pub fn expected_cash(&self) -> Money {
        Money::from_cents(self.tender_totals.cash_cents) + self.deposits_total()
            - self.withdrawals_total()
    }

    /// Closes the shift against the physically counted cash.
    ///
    /// The signed difference is informational: an over or short drawer never
    /// blocks the close. After this the register is frozen - every further
    /// transition is rejected.
    pub fn close(
        &mut self,
        counted: Money,
        operator: Operator,
        at: DateTime<Utc>,
    ) -> CoreResult<ClosingSummary> {
        if self.status == RegisterStatus::Closed {
            return Err(CoreError::RegisterAlreadyClosed);
        }

        let expected = self.expected_cash();
        let difference = counted - expected;

        self.status = RegisterStatus::Closed;
        self.counted_cents = Some(counted.cents());
        self.expected_cents = Some(expected.cents());
        self.difference_cents = Some(difference.cents());
        self.closed_at = Some(at);
        self.closed_by = Some(operator);

        Ok(ClosingSummary {
            expected_cents: expected.cents(),
            counted_cents: counted.cents(),
            difference_cents: difference.cents(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
