//! # Payment Allocator / Installment Generator
//!
//! Turns a sale total into one or more payment legs and, for
//! installment-capable methods, a due-date schedule.
//!
//! Pure computation: nothing here touches the register or persistence.
//! Posting an allocation to the ledger is a separate, explicit step, which
//! is what makes abandoning an in-flight checkout side-effect free.
//!
//! ## Installment arithmetic
//! ```text
//! amount = $100.00, count = 3, interval = 30 days
//!
//! per-installment = 10000 / 3 = 3333 cents (truncated)
//! final           = 10000 − 2 × 3333 = 3334 cents
//!
//! #1  d        $33.33
//! #2  d + 30   $33.33
//! #3  d + 60   $33.34   ← only the last absorbs the remainder
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CustomerCredit, PaymentMethod};
use crate::validation::{validate_installment_count, validate_payment_amount};

// =============================================================================
// Payment Spec
// =============================================================================

/// How one payment leg should be settled.
///
/// A closed tagged variant: the allocator matches on it exhaustively, so a
/// new tender type is a compile-time-checked change, never a runtime
/// fall-through.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentSpec {
    /// Cash handed over by the customer. `received_cents` must cover the
    /// amount due; the difference comes back as change.
    Cash { received_cents: i64 },

    /// Instant transfer, settled in full.
    Pix,

    /// Debit card, settled in full.
    Debit,

    /// Credit card, optionally in installments.
    Credit {
        installments: u32,
        #[ts(as = "String")]
        first_due: NaiveDate,
        interval_days: i64,
    },

    /// Store-extended credit ("fiado") against the customer's limit.
    /// Always scheduled - even a single installment has a due date.
    DeferredCredit {
        customer: CustomerCredit,
        installments: u32,
        #[ts(as = "String")]
        first_due: NaiveDate,
        interval_days: i64,
    },
}

impl PaymentSpec {
    /// The tender type this spec settles with.
    pub const fn method(&self) -> PaymentMethod {
        match self {
            PaymentSpec::Cash { .. } => PaymentMethod::Cash,
            PaymentSpec::Pix => PaymentMethod::Pix,
            PaymentSpec::Debit => PaymentMethod::Debit,
            PaymentSpec::Credit { .. } => PaymentMethod::Credit,
            PaymentSpec::DeferredCredit { .. } => PaymentMethod::DeferredCredit,
        }
    }
}

// =============================================================================
// Installment
// =============================================================================

/// One leg of an installment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    /// 1-based sequence number.
    pub number: u32,

    /// When this installment falls due.
    #[ts(as = "String")]
    pub due_date: NaiveDate,

    /// Amount in cents. The schedule sums exactly to the parent amount;
    /// only the last installment differs to absorb rounding.
    pub amount_cents: i64,
}

impl Installment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Payment Entry
// =============================================================================

/// One settled payment leg of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub method: PaymentMethod,

    /// Amount allocated to this leg, in cents.
    pub amount_cents: i64,

    /// For cash: what the customer handed over.
    pub tendered_cents: Option<i64>,

    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,

    /// For deferred credit: the customer the debt is booked against.
    pub customer_id: Option<String>,

    /// Due-date schedule for installment-capable methods. Empty for
    /// immediate settlement.
    pub installments: Vec<Installment>,
}

impl PaymentEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents.unwrap_or(0))
    }
}

// =============================================================================
// Installment Generation
// =============================================================================

/// Generates a due-date schedule for `amount` split into `count` legs.
///
/// Per-installment amount is `amount / count` truncated to the cent; the
/// final installment receives `amount − Σ previous` so the schedule sums
/// exactly to `amount`. Due dates are `start + i × interval_days`.
///
/// ## Example
/// ```rust
/// use balcao_core::money::Money;
/// use balcao_core::payment::generate_installments;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
/// let schedule = generate_installments(Money::from_cents(10000), 3, start, 30);
///
/// let amounts: Vec<i64> = schedule.iter().map(|i| i.amount_cents).collect();
/// assert_eq!(amounts, vec![3333, 3333, 3334]);
/// assert_eq!(schedule[2].due_date, NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
/// ```
pub fn generate_installments(
    amount: Money,
    count: u32,
    start: NaiveDate,
    interval_days: i64,
) -> Vec<Installment> {
    if count == 0 {
        return Vec::new();
    }

    let base = amount.cents() / count as i64;
    let mut schedule = Vec::with_capacity(count as usize);
    let mut allocated = 0i64;

    for i in 0..count {
        let is_last = i == count - 1;
        let cents = if is_last { amount.cents() - allocated } else { base };
        allocated += cents;
        schedule.push(Installment {
            number: i + 1,
            due_date: start + Duration::days(i as i64 * interval_days),
            amount_cents: cents,
        });
    }

    schedule
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocates the full sale total to a single payment leg.
///
/// Per-method preconditions:
/// - `Cash`: `received ≥ total`, change is the difference
/// - `DeferredCredit`: `creditLimit − currentDebt ≥ total` (equality accepted)
///
/// ## Example
/// ```rust
/// use balcao_core::money::Money;
/// use balcao_core::payment::{allocate, PaymentSpec};
///
/// let entry = allocate(
///     Money::from_cents(4750),
///     &PaymentSpec::Cash { received_cents: 5000 },
/// )
/// .unwrap();
/// assert_eq!(entry.change_cents, Some(250));
/// ```
pub fn allocate(total: Money, spec: &PaymentSpec) -> CoreResult<PaymentEntry> {
    validate_payment_amount(total.cents())?;
    allocate_amount(total, spec)
}

/// Allocates the sale total across several payment legs.
///
/// Each leg independently follows its per-method rules, and the leg amounts
/// must sum exactly to `total` - a short or over split is rejected before
/// anything is confirmed. (Integer cents make the original ±1-cent float
/// tolerance an exact comparison.)
pub fn allocate_split(
    total: Money,
    parts: &[(Money, PaymentSpec)],
) -> CoreResult<Vec<PaymentEntry>> {
    validate_payment_amount(total.cents())?;

    let paid: i64 = parts.iter().map(|(amount, _)| amount.cents()).sum();
    if paid != total.cents() {
        return Err(CoreError::SplitTotalMismatch {
            paid,
            total: total.cents(),
        });
    }

    parts
        .iter()
        .map(|(amount, spec)| {
            validate_payment_amount(amount.cents())?;
            allocate_amount(*amount, spec)
        })
        .collect()
}

/// Settles one leg for `amount` according to its spec.
fn allocate_amount(amount: Money, spec: &PaymentSpec) -> CoreResult<PaymentEntry> {
    match spec {
        PaymentSpec::Cash { received_cents } => {
            let received = Money::from_cents(*received_cents);
            if received < amount {
                return Err(CoreError::CashReceivedShort {
                    received: received.cents(),
                    total: amount.cents(),
                });
            }
            Ok(PaymentEntry {
                method: PaymentMethod::Cash,
                amount_cents: amount.cents(),
                tendered_cents: Some(received.cents()),
                change_cents: Some((received - amount).cents()),
                customer_id: None,
                installments: Vec::new(),
            })
        }

        PaymentSpec::Pix | PaymentSpec::Debit => Ok(PaymentEntry {
            method: spec.method(),
            amount_cents: amount.cents(),
            tendered_cents: None,
            change_cents: None,
            customer_id: None,
            installments: Vec::new(),
        }),

        PaymentSpec::Credit {
            installments,
            first_due,
            interval_days,
        } => {
            validate_installment_count(*installments)?;
            // a single credit installment settles immediately, no schedule
            let schedule = if *installments > 1 {
                generate_installments(amount, *installments, *first_due, *interval_days)
            } else {
                Vec::new()
            };
            Ok(PaymentEntry {
                method: PaymentMethod::Credit,
                amount_cents: amount.cents(),
                tendered_cents: None,
                change_cents: None,
                customer_id: None,
                installments: schedule,
            })
        }

        PaymentSpec::DeferredCredit {
            customer,
            installments,
            first_due,
            interval_days,
        } => {
            validate_installment_count(*installments)?;
            let available = customer.available();
            if available < amount {
                return Err(CoreError::InsufficientCredit {
                    available: available.cents(),
                    requested: amount.cents(),
                });
            }
            // deferred debt always carries a due-date schedule
            Ok(PaymentEntry {
                method: PaymentMethod::DeferredCredit,
                amount_cents: amount.cents(),
                tendered_cents: None,
                change_cents: None,
                customer_id: Some(customer.customer_id.clone()),
                installments: generate_installments(
                    amount,
                    (*installments).max(1),
                    *first_due,
                    *interval_days,
                ),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn customer(limit: i64, debt: i64) -> CustomerCredit {
        CustomerCredit {
            customer_id: "c-1".to_string(),
            credit_limit_cents: limit,
            current_debt_cents: debt,
        }
    }

    #[test]
    fn test_generate_installments_sums_exactly() {
        let schedule = generate_installments(Money::from_cents(10000), 3, d(2026, 8, 1), 30);

        let amounts: Vec<i64> = schedule.iter().map(|i| i.amount_cents).collect();
        assert_eq!(amounts, vec![3333, 3333, 3334]);
        assert_eq!(amounts.iter().sum::<i64>(), 10000);

        let dues: Vec<NaiveDate> = schedule.iter().map(|i| i.due_date).collect();
        assert_eq!(dues, vec![d(2026, 8, 1), d(2026, 8, 31), d(2026, 9, 30)]);

        let numbers: Vec<u32> = schedule.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_generate_installments_even_split_has_equal_legs() {
        let schedule = generate_installments(Money::from_cents(9000), 3, d(2026, 8, 1), 30);
        assert!(schedule.iter().all(|i| i.amount_cents == 3000));
    }

    #[test]
    fn test_installment_sum_property_over_awkward_amounts() {
        for (cents, count) in [(10001, 3), (99, 4), (1, 2), (77777, 12)] {
            let schedule = generate_installments(Money::from_cents(cents), count, d(2026, 1, 15), 30);
            let sum: i64 = schedule.iter().map(|i| i.amount_cents).sum();
            assert_eq!(sum, cents, "schedule must sum to parent for {cents}/{count}");
            // only the last leg may differ from the truncated base
            let base = cents / count as i64;
            for leg in &schedule[..schedule.len() - 1] {
                assert_eq!(leg.amount_cents, base);
            }
        }
    }

    #[test]
    fn test_cash_change() {
        let entry = allocate(
            Money::from_cents(4750),
            &PaymentSpec::Cash { received_cents: 5000 },
        )
        .unwrap();
        assert_eq!(entry.method, PaymentMethod::Cash);
        assert_eq!(entry.amount_cents, 4750);
        assert_eq!(entry.change_cents, Some(250));
        assert_eq!(entry.change(), Money::from_cents(250));
    }

    #[test]
    fn test_cash_short_is_rejected() {
        let err = allocate(
            Money::from_cents(5000),
            &PaymentSpec::Cash { received_cents: 4999 },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::CashReceivedShort { .. }));
    }

    #[test]
    fn test_credit_multi_installment() {
        let entry = allocate(
            Money::from_cents(30000),
            &PaymentSpec::Credit {
                installments: 3,
                first_due: d(2026, 9, 1),
                interval_days: 30,
            },
        )
        .unwrap();
        assert_eq!(entry.installments.len(), 3);
        assert_eq!(
            entry.installments.iter().map(|i| i.amount_cents).sum::<i64>(),
            30000
        );
    }

    #[test]
    fn test_single_credit_installment_has_no_schedule() {
        let entry = allocate(
            Money::from_cents(30000),
            &PaymentSpec::Credit {
                installments: 1,
                first_due: d(2026, 9, 1),
                interval_days: 30,
            },
        )
        .unwrap();
        assert!(entry.installments.is_empty());
    }

    #[test]
    fn test_deferred_credit_limit_is_hard() {
        let spec = |limit: i64| PaymentSpec::DeferredCredit {
            customer: customer(limit, 5000),
            installments: 1,
            first_due: d(2026, 9, 1),
            interval_days: 30,
        };

        // one cent short of headroom: rejected
        let err = allocate(Money::from_cents(10000), &spec(14999)).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientCredit { .. }));

        // exactly at the limit: accepted, schedule generated
        let entry = allocate(Money::from_cents(10000), &spec(15000)).unwrap();
        assert_eq!(entry.method, PaymentMethod::DeferredCredit);
        assert_eq!(entry.customer_id.as_deref(), Some("c-1"));
        assert_eq!(entry.installments.len(), 1);
        assert_eq!(entry.installments[0].amount_cents, 10000);
    }

    #[test]
    fn test_split_must_cover_total_exactly() {
        let total = Money::from_cents(10000);
        let parts = vec![
            (Money::from_cents(6000), PaymentSpec::Cash { received_cents: 6000 }),
            (Money::from_cents(3999), PaymentSpec::Debit),
        ];
        let err = allocate_split(total, &parts).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SplitTotalMismatch { paid: 9999, total: 10000 }
        ));
    }

    #[test]
    fn test_split_allocates_each_leg() {
        let total = Money::from_cents(10000);
        let parts = vec![
            (Money::from_cents(6000), PaymentSpec::Cash { received_cents: 7000 }),
            (
                Money::from_cents(4000),
                PaymentSpec::Credit {
                    installments: 2,
                    first_due: d(2026, 9, 1),
                    interval_days: 30,
                },
            ),
        ];
        let entries = allocate_split(total, &parts).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].change_cents, Some(1000));
        assert_eq!(entries[1].installments.len(), 2);
    }

    #[test]
    fn test_zero_total_is_rejected() {
        let err = allocate(Money::zero(), &PaymentSpec::Pix).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
