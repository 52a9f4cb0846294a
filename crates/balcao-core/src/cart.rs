//! # Cart Aggregation Engine
//!
//! Owns the in-memory cart lines and keeps totals consistent as items,
//! manual discounts, and automatic promotions interact.
//!
//! ## Recomputation Model
//! Every mutating operation ends in an explicit [`CartEngine::recompute`]
//! pass - a pure function over the lines and the current promotion
//! snapshot, invoked after each change rather than as an implicit effect.
//! A quantity change can change which promotion tier applies, so each
//! line is re-evaluated from scratch:
//!
//! ```text
//! originalSubtotal  = quantity × unitPrice   (weight × price/kg if weighted)
//! promotionDiscount = evaluator result for the current quantity
//! manualDiscount    = manual discount in cents (percent vs originalSubtotal)
//! effectiveDiscount = max(promotionDiscount, manualDiscount)   ← NOT stacked
//! effectiveSubtotal = max(0, originalSubtotal − effectiveDiscount)
//! ```
//!
//! Ties favor the promotion; the applied-promotion marker is kept only when
//! the promotion discount is the one in effect.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use chrono::NaiveDateTime;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::promotion::{evaluate, AppliedPromotion, LineContext, Promotion};
use crate::types::Product;
use crate::validation::{validate_discount, validate_quantity, validate_weight_grams};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Manual Discount
// =============================================================================

/// How a manual discount amount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `amount` is in basis points of the subtotal it applies to.
    Percent,
    /// `amount` is an absolute value in cents.
    Value,
}

/// An operator-entered discount, per-line or order-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ManualDiscount {
    pub kind: DiscountKind,
    /// Basis points for `Percent`, cents for `Value`.
    pub amount: i64,
}

impl ManualDiscount {
    /// Converts the discount to absolute cents against the given subtotal.
    pub fn as_cents(&self, subtotal: Money) -> Money {
        match self.kind {
            DiscountKind::Percent => subtotal.percent_of(self.amount.max(0) as u32),
            DiscountKind::Value => Money::from_cents(self.amount.max(0)),
        }
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Line quantity: a unit count, or a captured weight for weighted products.
/// The two are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Units(i64),
    Grams(i64),
}

// =============================================================================
// Cart Line
// =============================================================================

/// One cart entry: a product at some quantity or weight.
///
/// Product fields are frozen at the moment the line is created, so the cart
/// stays consistent even if the catalog changes underneath it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Session-local line id.
    pub line_id: u64,

    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Category at time of adding (frozen).
    pub category_id: Option<String>,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Unit count or captured weight.
    pub quantity: Quantity,

    /// Operator-entered discount for this line.
    pub manual_discount: Option<ManualDiscount>,

    /// The automatic promotion currently in effect, if it beats the manual
    /// discount. Recomputed on every cart change.
    pub applied_promotion: Option<AppliedPromotion>,

    /// Quantity × unit price, pre-discount.
    pub original_subtotal_cents: i64,

    /// Post best-discount subtotal. Always within `[0, original]`.
    pub effective_subtotal_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn original_subtotal(&self) -> Money {
        Money::from_cents(self.original_subtotal_cents)
    }

    #[inline]
    pub fn effective_subtotal(&self) -> Money {
        Money::from_cents(self.effective_subtotal_cents)
    }

    /// The discount currently in effect (promotion or manual, whichever won).
    #[inline]
    pub fn effective_discount(&self) -> Money {
        self.original_subtotal() - self.effective_subtotal()
    }

    #[inline]
    pub fn is_weighted(&self) -> bool {
        matches!(self.quantity, Quantity::Grams(_))
    }

    /// Quantity as seen by the promotion evaluator: weighted lines count
    /// as a single unit, so quantity-tier rules cannot trigger on them.
    fn eval_quantity(&self) -> i64 {
        match self.quantity {
            Quantity::Units(n) => n,
            Quantity::Grams(_) => 1,
        }
    }

    fn compute_original_subtotal(&self) -> Money {
        match self.quantity {
            Quantity::Units(n) => self.unit_price() * n,
            Quantity::Grams(g) => self.unit_price().times_grams(g),
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Order-level totals, recomputed from the lines on demand.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    /// Σ originalSubtotal.
    pub subtotal_cents: i64,
    /// Σ effectiveSubtotal, after per-line promotions/discounts.
    pub subtotal_after_line_discounts_cents: i64,
    /// Order-level discount, in cents, applied on top of the line subtotals.
    pub order_discount_cents: i64,
    /// Loyalty points redeemed against this order, in cents.
    pub loyalty_redemption_cents: i64,
    /// `max(0, afterLineDiscounts − orderDiscount − loyaltyRedemption)`.
    pub total_cents: i64,
}

// =============================================================================
// Cart Engine
// =============================================================================

/// The in-memory cart for the current session.
///
/// Holds a snapshot of the active promotion set; callers refresh it via
/// [`CartEngine::set_promotions`] when the catalog changes. Mutating
/// operations take `now` because promotion validity is time-of-day
/// sensitive.
#[derive(Debug, Clone, Default)]
pub struct CartEngine {
    lines: Vec<CartLine>,
    promotions: Vec<Promotion>,
    order_discount: Option<ManualDiscount>,
    loyalty_redemption_cents: i64,
    next_line_id: u64,
}

impl CartEngine {
    /// Creates an empty cart with the given active-promotion snapshot.
    pub fn new(promotions: Vec<Promotion>) -> Self {
        CartEngine {
            lines: Vec::new(),
            promotions,
            order_discount: None,
            loyalty_redemption_cents: 0,
            next_line_id: 0,
        }
    }

    /// Replaces the active-promotion snapshot and re-evaluates every line.
    pub fn set_promotions(&mut self, promotions: Vec<Promotion>, now: NaiveDateTime) {
        self.promotions = promotions;
        self.recompute(now);
    }

    /// Adds a unit-quantity line for a product, merging with an existing
    /// line for the same product.
    ///
    /// Weighted products are rejected here - they go through weight capture
    /// and [`CartEngine::add_weighted_line`].
    pub fn add_line(
        &mut self,
        product: &Product,
        quantity: i64,
        now: NaiveDateTime,
    ) -> CoreResult<u64> {
        validate_quantity(quantity)?;
        if product.is_weighted {
            return Err(CoreError::WeightRequired {
                product_id: product.id.clone(),
            });
        }

        let existing = self.lines.iter_mut().find_map(|l| match l.quantity {
            Quantity::Units(current) if l.product_id == product.id => Some((l, current)),
            _ => None,
        });
        if let Some((line, current)) = existing {
            let merged = current + quantity;
            if merged > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = Quantity::Units(merged);
            let id = line.line_id;
            self.recompute(now);
            return Ok(id);
        }

        let id = self.push_line(product, Quantity::Units(quantity))?;
        self.recompute(now);
        Ok(id)
    }

    /// Adds a weighted line with a captured weight in grams.
    ///
    /// Each weighing is its own line; weighted lines are never merged.
    pub fn add_weighted_line(
        &mut self,
        product: &Product,
        grams: i64,
        now: NaiveDateTime,
    ) -> CoreResult<u64> {
        validate_weight_grams(grams)?;
        if !product.is_weighted {
            return Err(CoreError::NotWeighted {
                product_id: product.id.clone(),
            });
        }

        let id = self.push_line(product, Quantity::Grams(grams))?;
        self.recompute(now);
        Ok(id)
    }

    /// Sets the unit quantity of a line. A quantity of zero or less removes
    /// the line. Rejected on weighted lines (no quantity stepper).
    pub fn set_quantity(&mut self, line_id: u64, quantity: i64, now: NaiveDateTime) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or(CoreError::LineNotFound(line_id))?;

        if line.is_weighted() {
            return Err(CoreError::WeightRequired {
                product_id: line.product_id.clone(),
            });
        }

        if quantity <= 0 {
            return self.remove_line(line_id);
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        line.quantity = Quantity::Units(quantity);
        self.recompute(now);
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&mut self, line_id: u64) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);
        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(line_id));
        }
        Ok(())
    }

    /// Sets or clears the manual discount on a line.
    pub fn set_manual_discount(
        &mut self,
        line_id: u64,
        discount: Option<ManualDiscount>,
        now: NaiveDateTime,
    ) -> CoreResult<()> {
        if let Some(d) = &discount {
            validate_discount(d)?;
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or(CoreError::LineNotFound(line_id))?;
        line.manual_discount = discount;
        self.recompute(now);
        Ok(())
    }

    /// Sets or clears the order-level discount, applied on top of the
    /// per-line subtotals at totals time.
    pub fn set_order_discount(&mut self, discount: Option<ManualDiscount>) -> CoreResult<()> {
        if let Some(d) = &discount {
            validate_discount(d)?;
        }
        self.order_discount = discount;
        Ok(())
    }

    /// Sets the loyalty value redeemed against this order, in cents.
    pub fn set_loyalty_redemption(&mut self, cents: i64) -> CoreResult<()> {
        if cents < 0 {
            return Err(crate::error::ValidationError::MustBePositive {
                field: "loyalty redemption".to_string(),
            }
            .into());
        }
        self.loyalty_redemption_cents = cents;
        Ok(())
    }

    /// Clears all lines and order-level adjustments.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.order_discount = None;
        self.loyalty_redemption_cents = 0;
    }

    /// Re-evaluates every line against the promotion snapshot and rebuilds
    /// per-line subtotals. Pure over the cart state and `now`.
    pub fn recompute(&mut self, now: NaiveDateTime) {
        for line in &mut self.lines {
            let original = line.compute_original_subtotal();

            let ctx = LineContext {
                product_id: &line.product_id,
                category_id: line.category_id.as_deref(),
                quantity: line.eval_quantity(),
                unit_price: line.unit_price(),
                line_total: original,
            };
            let promotion = evaluate(&self.promotions, &ctx, now);
            let promotion_discount = promotion
                .as_ref()
                .map(|p| p.discount)
                .unwrap_or_else(Money::zero);

            let manual_discount = line
                .manual_discount
                .map(|d| d.as_cents(original))
                .unwrap_or_else(Money::zero)
                .min(original);

            // the larger discount wins; ties keep the promotion marker
            let (applied, effective_discount) =
                if promotion_discount.is_positive() && promotion_discount >= manual_discount {
                    (promotion, promotion_discount)
                } else {
                    (None, manual_discount)
                };

            line.applied_promotion = applied;
            line.original_subtotal_cents = original.cents();
            line.effective_subtotal_cents =
                (original - effective_discount).clamp_non_negative().cents();
        }
    }

    /// Computes the order-level totals.
    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.original_subtotal());
        let after_lines: Money = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.effective_subtotal());

        let order_discount = self
            .order_discount
            .map(|d| d.as_cents(after_lines))
            .unwrap_or_else(Money::zero)
            .min(after_lines);

        let loyalty = Money::from_cents(self.loyalty_redemption_cents);
        let total = (after_lines - order_discount - loyalty).clamp_non_negative();

        CartTotals {
            line_count: self.lines.len(),
            subtotal_cents: subtotal.cents(),
            subtotal_after_line_discounts_cents: after_lines.cents(),
            order_discount_cents: order_discount.cents(),
            loyalty_redemption_cents: self.loyalty_redemption_cents,
            total_cents: total.cents(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: u64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push_line(&mut self, product: &Product, quantity: Quantity) -> CoreResult<u64> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        self.next_line_id += 1;
        let id = self.next_line_id;
        self.lines.push(CartLine {
            line_id: id,
            product_id: product.id.clone(),
            name: product.name.clone(),
            category_id: product.category_id.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            manual_discount: None,
            applied_promotion: None,
            original_subtotal_cents: 0,
            effective_subtotal_cents: 0,
        });
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
