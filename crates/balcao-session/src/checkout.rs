//! # Checkout Session
//!
//! Drives a sale from cart mutation through payment allocation to the
//! posted ledger entry.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  UI action              Session call             Effect             │
//! │  ─────────              ────────────             ──────             │
//! │  Scan product ────────► add_product() ─────────► cart line + totals │
//! │  Weigh product ───────► add_weighted_product() ► cart line + totals │
//! │  Change quantity ─────► set_quantity() ────────► recompute          │
//! │  Enter discount ──────► set_manual_discount() ─► recompute          │
//! │  Pick tender(s) ──────► confirm()/confirm_split()                   │
//! │                            │                                        │
//! │                            ├─ allocate (pure, abortable)            │
//! │                            ├─ record_sale (awaited write)           │
//! │                            └─ post to register + clear cart         │
//! │                               ONLY after the write succeeds         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Allocation is pure, so an in-flight checkout abandoned before `confirm`
//! leaves no trace. On a persistence failure the cart and register are left
//! exactly as they were.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use balcao_core::{
    allocate, allocate_split, CartEngine, CartTotals, CashRegister, CoreError, ManualDiscount,
    Money, Operator, PaymentEntry, PaymentSpec,
};

use crate::error::{SessionError, SessionResult};
use crate::ports::{AuditEvent, AuditSink, Catalog, Customers, SaleLineRecord, SaleRecord, TransactionStore};

// =============================================================================
// Payment Draft
// =============================================================================

/// A payment leg as the UI captures it.
///
/// Mirrors [`PaymentSpec`] except that deferred credit carries a customer
/// id; the session resolves it against the customer port before allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDraft {
    Cash {
        received_cents: i64,
    },
    Pix,
    Debit,
    Credit {
        installments: u32,
        first_due: NaiveDate,
        interval_days: i64,
    },
    DeferredCredit {
        customer_id: String,
        installments: u32,
        first_due: NaiveDate,
        interval_days: i64,
    },
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One cashier session: a cart plus the ports it needs.
///
/// All methods take `&mut self`, so ledger-mutating calls are serialized by
/// construction - no two can be in flight against the same session.
pub struct CheckoutSession<C, U, S, A> {
    catalog: C,
    customers: U,
    store: S,
    audit: A,
    cart: CartEngine,
}

impl<C, U, S, A> CheckoutSession<C, U, S, A>
where
    C: Catalog,
    U: Customers,
    S: TransactionStore,
    A: AuditSink,
{
    /// Creates a session with an empty cart and no promotion snapshot.
    /// Call [`CheckoutSession::refresh_promotions`] before selling.
    pub fn new(catalog: C, customers: U, store: S, audit: A) -> Self {
        CheckoutSession {
            catalog,
            customers,
            store,
            audit,
            cart: CartEngine::new(Vec::new()),
        }
    }

    /// Reloads the active-promotion snapshot from the catalog and
    /// re-evaluates the cart.
    pub async fn refresh_promotions(&mut self, now: NaiveDateTime) -> SessionResult<()> {
        let promotions = self.catalog.list_active_promotions(now).await?;
        debug!(count = promotions.len(), "Promotion snapshot refreshed");
        self.cart.set_promotions(promotions, now);
        Ok(())
    }

    /// Fetches a product and adds it to the cart as a unit line.
    pub async fn add_product(
        &mut self,
        product_id: &str,
        quantity: i64,
        now: NaiveDateTime,
    ) -> SessionResult<u64> {
        let product = self.catalog.get_product(product_id).await?;
        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: quantity,
            }
            .into());
        }
        let line_id = self.cart.add_line(&product, quantity, now)?;
        debug!(product_id, quantity, line_id, "Line added");
        Ok(line_id)
    }

    /// Fetches a weighted product and adds it with a captured weight.
    pub async fn add_weighted_product(
        &mut self,
        product_id: &str,
        grams: i64,
        now: NaiveDateTime,
    ) -> SessionResult<u64> {
        let product = self.catalog.get_product(product_id).await?;
        if !product.can_sell(grams) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: grams,
            }
            .into());
        }
        let line_id = self.cart.add_weighted_line(&product, grams, now)?;
        debug!(product_id, grams, line_id, "Weighted line added");
        Ok(line_id)
    }

    pub fn set_quantity(&mut self, line_id: u64, quantity: i64, now: NaiveDateTime) -> SessionResult<()> {
        self.cart.set_quantity(line_id, quantity, now)?;
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: u64) -> SessionResult<()> {
        self.cart.remove_line(line_id)?;
        Ok(())
    }

    pub fn set_manual_discount(
        &mut self,
        line_id: u64,
        discount: Option<ManualDiscount>,
        now: NaiveDateTime,
    ) -> SessionResult<()> {
        self.cart.set_manual_discount(line_id, discount, now)?;
        Ok(())
    }

    pub fn set_order_discount(&mut self, discount: Option<ManualDiscount>) -> SessionResult<()> {
        self.cart.set_order_discount(discount)?;
        Ok(())
    }

    pub fn set_loyalty_redemption(&mut self, cents: i64) -> SessionResult<()> {
        self.cart.set_loyalty_redemption(cents)?;
        Ok(())
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn cart(&self) -> &CartEngine {
        &self.cart
    }

    /// Confirms the sale with a single payment leg covering the full total.
    pub async fn confirm(
        &mut self,
        register: &mut CashRegister,
        draft: PaymentDraft,
        operator: Operator,
    ) -> SessionResult<SaleRecord> {
        if self.cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }
        let total = Money::from_cents(self.cart.totals().total_cents);
        let spec = self.resolve_spec(draft).await?;
        let entries = vec![allocate(total, &spec)?];
        self.finalize(register, entries, operator).await
    }

    /// Confirms the sale split across several payment legs. The leg amounts
    /// must sum exactly to the sale total or the whole operation is
    /// rejected.
    pub async fn confirm_split(
        &mut self,
        register: &mut CashRegister,
        parts: Vec<(Money, PaymentDraft)>,
        operator: Operator,
    ) -> SessionResult<SaleRecord> {
        if self.cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }
        let total = Money::from_cents(self.cart.totals().total_cents);

        let mut resolved = Vec::with_capacity(parts.len());
        for (amount, draft) in parts {
            resolved.push((amount, self.resolve_spec(draft).await?));
        }
        let entries = allocate_split(total, &resolved)?;
        self.finalize(register, entries, operator).await
    }

    /// Resolves a UI draft into an allocatable spec, fetching customer
    /// credit for deferred legs.
    async fn resolve_spec(&self, draft: PaymentDraft) -> SessionResult<PaymentSpec> {
        Ok(match draft {
            PaymentDraft::Cash { received_cents } => PaymentSpec::Cash { received_cents },
            PaymentDraft::Pix => PaymentSpec::Pix,
            PaymentDraft::Debit => PaymentSpec::Debit,
            PaymentDraft::Credit {
                installments,
                first_due,
                interval_days,
            } => PaymentSpec::Credit {
                installments,
                first_due,
                interval_days,
            },
            PaymentDraft::DeferredCredit {
                customer_id,
                installments,
                first_due,
                interval_days,
            } => {
                let customer = self.customers.get_customer_credit(&customer_id).await?;
                PaymentSpec::DeferredCredit {
                    customer,
                    installments,
                    first_due,
                    interval_days,
                }
            }
        })
    }

    /// Persists the sale, then - and only then - posts it to the register
    /// and clears the cart.
    async fn finalize(
        &mut self,
        register: &mut CashRegister,
        entries: Vec<PaymentEntry>,
        operator: Operator,
    ) -> SessionResult<SaleRecord> {
        let totals = self.cart.totals();
        let record = SaleRecord {
            id: Uuid::new_v4().to_string(),
            shift_id: register.id.clone(),
            lines: self
                .cart
                .lines()
                .iter()
                .map(|l| SaleLineRecord {
                    product_id: l.product_id.clone(),
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                    original_subtotal_cents: l.original_subtotal_cents,
                    discount_cents: l.effective_discount().cents(),
                    effective_subtotal_cents: l.effective_subtotal_cents,
                    promotion_id: l.applied_promotion.as_ref().map(|p| p.promotion_id.clone()),
                })
                .collect(),
            subtotal_cents: totals.subtotal_cents,
            order_discount_cents: totals.order_discount_cents,
            loyalty_redemption_cents: totals.loyalty_redemption_cents,
            total_cents: totals.total_cents,
            payments: entries.clone(),
            operator,
            created_at: Utc::now(),
        };

        // validate the register transition on a working copy first, so a
        // rejected posting never reaches persistence
        let mut working = register.clone();
        working.post_sale(&entries)?;

        self.store.record_sale(&record).await?;
        *register = working;

        for line in self.cart.lines() {
            if let Some(promotion) = &line.applied_promotion {
                self.audit.log_event(AuditEvent {
                    action: "promotion_applied".to_string(),
                    entity_type: "cart_line".to_string(),
                    entity_id: line.line_id.to_string(),
                    old_values: None,
                    new_values: Some(json!({
                        "promotionId": promotion.promotion_id,
                        "discountCents": promotion.discount.cents(),
                    })),
                    reason: None,
                });
            } else if line.effective_discount().is_positive() {
                self.audit.log_event(AuditEvent {
                    action: "discount_applied".to_string(),
                    entity_type: "cart_line".to_string(),
                    entity_id: line.line_id.to_string(),
                    old_values: None,
                    new_values: Some(json!({
                        "discountCents": line.effective_discount().cents(),
                    })),
                    reason: None,
                });
            }
        }
        self.audit.log_event(AuditEvent {
            action: "sale_recorded".to_string(),
            entity_type: "sale".to_string(),
            entity_id: record.id.clone(),
            old_values: None,
            new_values: Some(json!({
                "totalCents": record.total_cents,
                "legs": record.payments.len(),
            })),
            reason: None,
        });

        self.cart.clear();

        info!(
            sale_id = %record.id,
            total = record.total_cents,
            legs = record.payments.len(),
            "Sale confirmed"
        );

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
