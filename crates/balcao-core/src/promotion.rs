//! # Promotion Rule Evaluator
//!
//! Pure evaluation of automatic promotion rules against a single cart line.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  active promotions                                                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  1. applicability filter (product id / category / "all")            │
//! │  2. validity window (date, time-of-day, day-of-week)                │
//! │  3. threshold gates (min quantity, min line value)                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  4. sort: priority desc, id asc → take the FIRST candidate          │
//! │  5. per-kind discount math                                          │
//! │  6. clamp to max discount and to the line total                     │
//! │  7. discount ≤ 0 → no promotion                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one automatic promotion applies per line. The `is_cumulative`
//! flag is carried on the rule but reserved for cross-line stacking; it is
//! not evaluated here.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::DayOfWeek;
use crate::{DEFAULT_PROGRESSIVE_CAP_BPS, PROGRESSIVE_STEP_BPS};

// =============================================================================
// Promotion Kind
// =============================================================================

/// The discount mechanics of a promotion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// Percentage off the line total. `value` is in basis points.
    Percentage,
    /// Fixed amount off the line total. `value` is in cents, capped at the
    /// line total (never discounts below zero).
    Fixed,
    /// Buy X, get Y free. Discount is the price of the free units in each
    /// complete set of `buy + get`.
    BuyXGetY,
    /// Bundle price, evaluated per-line as a percentage gated on
    /// `min_quantity`. `value` is in basis points.
    Combo,
    /// Percentage that grows with quantity: the rate climbs from `value`
    /// by a fixed step per unit above `min_quantity`, up to a ceiling.
    Progressive,
    /// Percentage gated on the rule's time-of-day / day-of-week window.
    /// `value` is in basis points.
    HappyHour,
}

// =============================================================================
// Promotion Rule
// =============================================================================

/// An active promotion rule from the catalog.
///
/// ## Validity window
/// A rule is live when the current date is within `[start_date, end_date]`,
/// the current time-of-day is within `[start_time, end_time]` when both are
/// set (minute resolution, no wraparound across midnight), and the current
/// weekday is in `days_of_week` when that set is present.
///
/// ## Applicability
/// A rule with both `product_ids` and `category_ids` empty applies to every
/// product; otherwise it applies to the listed products and categories.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    /// Unique identifier (UUID v4). Also the deterministic tie-break key
    /// when two rules share a priority.
    pub id: String,

    /// Display name, used in the applied-promotion description.
    pub name: String,

    /// Discount mechanics.
    pub kind: PromotionKind,

    /// Kind-dependent magnitude: basis points for the percentage family
    /// (`Percentage`, `Combo`, `Progressive`, `HappyHour`), cents for `Fixed`.
    /// Unused by `BuyXGetY`.
    pub value: i64,

    /// Units that must be bought per set (`BuyXGetY` only).
    pub buy_quantity: Option<i64>,

    /// Units given free per set (`BuyXGetY` only).
    pub get_quantity: Option<i64>,

    /// Minimum line quantity for the rule to apply.
    pub min_quantity: Option<i64>,

    /// Minimum line total, in cents, for the rule to apply.
    pub min_value_cents: Option<i64>,

    /// Absolute cap on the computed discount, in cents.
    pub max_discount_cents: Option<i64>,

    /// Rate ceiling for `Progressive`, in basis points. Defaults to 50%.
    pub max_rate_bps: Option<u32>,

    /// First day the rule is valid.
    #[ts(as = "String")]
    pub start_date: NaiveDate,

    /// Last day the rule is valid (inclusive).
    #[ts(as = "String")]
    pub end_date: NaiveDate,

    /// Start of the daily time window. Only honored together with `end_time`.
    #[ts(as = "Option<String>")]
    pub start_time: Option<NaiveTime>,

    /// End of the daily time window (inclusive, minute resolution).
    #[ts(as = "Option<String>")]
    pub end_time: Option<NaiveTime>,

    /// Weekdays the rule is valid on. Absent means every day.
    pub days_of_week: Option<Vec<DayOfWeek>>,

    /// Products the rule applies to.
    pub product_ids: Vec<String>,

    /// Categories the rule applies to.
    pub category_ids: Vec<String>,

    /// Higher priority wins when several rules match.
    pub priority: i32,

    /// Reserved for cross-line stacking; not evaluated per-line.
    pub is_cumulative: bool,

    /// Whether the rule is active.
    pub is_active: bool,
}

impl Promotion {
    /// Checks whether this rule applies to the given product.
    pub fn applies_to(&self, product_id: &str, category_id: Option<&str>) -> bool {
        if self.product_ids.is_empty() && self.category_ids.is_empty() {
            return true;
        }
        if self.product_ids.iter().any(|p| p == product_id) {
            return true;
        }
        match category_id {
            Some(cat) => self.category_ids.iter().any(|c| c == cat),
            None => false,
        }
    }

    /// Checks the rule's validity window against `now`.
    ///
    /// Time-of-day comparison is at minute resolution and does not wrap
    /// across midnight; a window with only one of start/end set is ignored.
    pub fn is_within_window(&self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if today < self.start_date || today > self.end_date {
            return false;
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            let minute = minute_of_day(now.time());
            if minute < minute_of_day(start) || minute > minute_of_day(end) {
                return false;
            }
        }

        if let Some(days) = &self.days_of_week {
            if !days.contains(&DayOfWeek::from_chrono(now.weekday())) {
                return false;
            }
        }

        true
    }

    /// Checks quantity/value thresholds against the line.
    fn passes_thresholds(&self, line: &LineContext<'_>) -> bool {
        if let Some(min_qty) = self.min_quantity {
            if line.quantity < min_qty {
                return false;
            }
        }
        if let Some(min_value) = self.min_value_cents {
            if line.line_total.cents() < min_value {
                return false;
            }
        }
        true
    }

    /// Computes the raw (unclamped) discount for this rule on the line.
    fn compute_discount(&self, line: &LineContext<'_>) -> Money {
        match self.kind {
            PromotionKind::Percentage | PromotionKind::HappyHour | PromotionKind::Combo => {
                line.line_total.percent_of(self.value.max(0) as u32)
            }
            PromotionKind::Fixed => {
                Money::from_cents(self.value.max(0)).min(line.line_total)
            }
            PromotionKind::BuyXGetY => {
                let buy = self.buy_quantity.unwrap_or(0);
                let get = self.get_quantity.unwrap_or(0);
                let set_size = buy + get;
                if set_size <= 0 || get <= 0 {
                    return Money::zero();
                }
                let sets = line.quantity / set_size;
                line.unit_price * (sets * get)
            }
            PromotionKind::Progressive => {
                let min_qty = self.min_quantity.unwrap_or(1);
                let extra_units = (line.quantity - min_qty).max(0);
                let cap = self
                    .max_rate_bps
                    .unwrap_or(DEFAULT_PROGRESSIVE_CAP_BPS) as i64;
                let rate = (self.value + extra_units * PROGRESSIVE_STEP_BPS).min(cap).max(0);
                line.line_total.percent_of(rate as u32)
            }
        }
    }
}

#[inline]
fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

// =============================================================================
// Applied Promotion
// =============================================================================

/// The outcome of evaluating a line: which rule won and by how much.
///
/// Ephemeral - recomputed on every cart change, never persisted apart from
/// the sale it ends up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotion {
    /// The winning rule.
    pub promotion_id: String,

    /// Rule name, frozen for display.
    pub name: String,

    /// Discount mechanics of the winning rule.
    pub kind: PromotionKind,

    /// Computed discount for the line.
    pub discount: Money,

    /// Human-readable description for the cart UI and receipt.
    pub description: String,
}

// =============================================================================
// Line Context
// =============================================================================

/// The slice of a cart line the evaluator needs.
///
/// Weighted lines pass `quantity = 1`: percentage-family rules still apply
/// to their line total, quantity-tier rules cannot trigger.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub product_id: &'a str,
    pub category_id: Option<&'a str>,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates the active promotion set against one cart line and returns the
/// single best-applicable discount, or `None`.
///
/// Candidates surviving the applicability, window, and threshold filters are
/// ordered by priority descending; ties are broken by promotion id ascending
/// so evaluation is deterministic. Only the first candidate is computed -
/// one automatic promotion per line.
///
/// ## Example
/// ```rust
/// use balcao_core::money::Money;
/// use balcao_core::promotion::{evaluate, LineContext, Promotion, PromotionKind};
/// use chrono::NaiveDate;
///
/// let promo = Promotion {
///     id: "pr-1".to_string(),
///     name: "10% off".to_string(),
///     kind: PromotionKind::Percentage,
///     value: 1000,
///     buy_quantity: None,
///     get_quantity: None,
///     min_quantity: None,
///     min_value_cents: None,
///     max_discount_cents: None,
///     max_rate_bps: None,
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
///     start_time: None,
///     end_time: None,
///     days_of_week: None,
///     product_ids: vec![],
///     category_ids: vec![],
///     priority: 0,
///     is_cumulative: false,
///     is_active: true,
/// };
///
/// let line = LineContext {
///     product_id: "p-1",
///     category_id: None,
///     quantity: 2,
///     unit_price: Money::from_cents(10000),
///     line_total: Money::from_cents(20000),
/// };
/// let now = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
///
/// let applied = evaluate(&[promo], &line, now).unwrap();
/// assert_eq!(applied.discount.cents(), 2000); // $20.00 off $200.00
/// ```
pub fn evaluate(
    promotions: &[Promotion],
    line: &LineContext<'_>,
    now: NaiveDateTime,
) -> Option<AppliedPromotion> {
    let mut candidates: Vec<&Promotion> = promotions
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| p.applies_to(line.product_id, line.category_id))
        .filter(|p| p.is_within_window(now))
        .filter(|p| p.passes_thresholds(line))
        .collect();

    candidates.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.id.cmp(&b.id))
    });

    let winner = candidates.first()?;

    let mut discount = winner.compute_discount(line);
    if let Some(cap) = winner.max_discount_cents {
        discount = discount.min(Money::from_cents(cap));
    }
    discount = discount.min(line.line_total);

    if !discount.is_positive() {
        return None;
    }

    Some(AppliedPromotion {
        promotion_id: winner.id.clone(),
        name: winner.name.clone(),
        kind: winner.kind,
        discount,
        description: format!("{} (-{})", winner.name, discount),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
