//! # External Ports
//!
//! The narrow contracts the transaction core consumes. Concrete transport
//! and storage live in the consuming application; this crate only defines
//! the traits and the snapshot types that cross them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      External Collaborators                         │
//! │                                                                     │
//! │  Catalog ──────────► getProduct, listActivePromotions   (read)      │
//! │  Customers ────────► getCustomerCredit                  (read)      │
//! │  TransactionStore ─► recordSale, recordCashMovement,    (write)     │
//! │                      recordRegisterOpen/Close                       │
//! │  AuditSink ────────► logEvent                 (fire-and-forget)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are awaited by the session, which treats a ledger transition as
//! not-having-happened until the write succeeds. The audit sink is the one
//! exception: the session never blocks on or propagates its result.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use balcao_core::{
    CashMovement, CashRegister, CustomerCredit, Operator, PaymentEntry, Product, Promotion,
    Quantity,
};

// =============================================================================
// Port Error
// =============================================================================

/// Failure of an external collaborator.
///
/// Propagated to the caller as-is: the session does not retry and does not
/// partially commit.
#[derive(Debug, Error)]
pub enum PortError {
    /// Entity does not exist on the other side.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Collaborator is unreachable or rejected the call.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Any other collaborator-side failure.
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

// =============================================================================
// Read Ports
// =============================================================================

/// Catalog read access.
pub trait Catalog {
    /// Fetches a product by id.
    async fn get_product(&self, id: &str) -> Result<Product, PortError>;

    /// Lists promotions active at `now`, pre-filtered to `is_active`.
    async fn list_active_promotions(&self, now: NaiveDateTime) -> Result<Vec<Promotion>, PortError>;
}

/// Customer read access, for deferred-credit eligibility checks.
pub trait Customers {
    async fn get_customer_credit(&self, id: &str) -> Result<CustomerCredit, PortError>;
}

// =============================================================================
// Write Port
// =============================================================================

/// Persistence writes. Awaited by the session; a ledger transition commits
/// in memory only after the matching write returns `Ok`.
pub trait TransactionStore {
    async fn record_sale(&self, sale: &SaleRecord) -> Result<(), PortError>;

    async fn record_cash_movement(&self, movement: &CashMovement) -> Result<(), PortError>;

    async fn record_register_open(&self, register: &CashRegister) -> Result<(), PortError>;

    async fn record_register_close(&self, register: &CashRegister) -> Result<(), PortError>;
}

// =============================================================================
// Audit Sink
// =============================================================================

/// One audit event per register transition and per promotion/discount
/// application at confirm time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// What happened, e.g. `register_opened`, `promotion_applied`.
    pub action: String,

    /// Entity category, e.g. `register`, `sale`, `cart_line`.
    pub entity_type: String,

    /// Identifier of the affected entity.
    pub entity_id: String,

    /// State before the transition, when meaningful.
    pub old_values: Option<serde_json::Value>,

    /// State after the transition.
    pub new_values: Option<serde_json::Value>,

    /// Operator-supplied reason, when one was required.
    pub reason: Option<String>,
}

/// Fire-and-forget audit delivery.
///
/// Implementations enqueue internally and must not block; the session
/// ignores delivery failures by construction (there is nothing to return).
pub trait AuditSink {
    fn log_event(&self, event: AuditEvent);
}

// =============================================================================
// Sale Snapshot
// =============================================================================

/// One line of a confirmed sale, frozen at confirmation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRecord {
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    pub quantity: Quantity,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Pre-discount line subtotal.
    pub original_subtotal_cents: i64,

    /// Discount in effect (promotion or manual, whichever won).
    pub discount_cents: i64,

    /// Post-discount line subtotal.
    pub effective_subtotal_cents: i64,

    /// The winning promotion, when one was in effect.
    pub promotion_id: Option<String>,
}

/// The persisted snapshot of a confirmed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shift the sale was posted under.
    pub shift_id: String,

    pub lines: Vec<SaleLineRecord>,

    /// Σ original line subtotals.
    pub subtotal_cents: i64,

    /// Order-level discount in cents.
    pub order_discount_cents: i64,

    /// Loyalty value redeemed, in cents.
    pub loyalty_redemption_cents: i64,

    /// Final amount settled by the payment legs.
    pub total_cents: i64,

    /// Settled payment legs, including installment schedules.
    pub payments: Vec<PaymentEntry>,

    pub operator: Operator,

    pub created_at: DateTime<Utc>,
}
