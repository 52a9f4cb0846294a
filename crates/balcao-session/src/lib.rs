//! # balcao-session: Ports + Checkout/Shift Orchestration
//!
//! The session layer for Balcão POS. Where [`balcao_core`] is pure
//! computation, this crate owns the narrow contracts to the external
//! collaborators and the two services that drive them:
//!
//! - [`ports`] - traits for the catalog, customer, persistence, and audit
//!   collaborators, plus the sale snapshot types that cross them
//! - [`checkout`] - [`checkout::CheckoutSession`]: cart mutation through
//!   payment allocation to the posted ledger entry
//! - [`shift`] - [`shift::ShiftManager`]: register lifecycle
//!   (open → movements/sales → close) against persistence
//! - [`error`] - [`error::SessionError`], what the UI layer sees
//!
//! ## Commit Discipline
//! A ledger transition is considered not to have happened until its
//! persistence write succeeds: transitions are computed on a working copy
//! of the register, written out, and only then committed to memory. The
//! audit sink is fire-and-forget and never blocks a transition.
//!
//! ## Concurrency Model
//! Single session, single register, cooperative: every ledger-mutating
//! method takes `&mut self`, so callers are serialized at compile time.
//! There is no cross-register or cross-session locking here.

// Ports are consumed through generic bounds within this workspace, so the
// auto-trait caveat the lint warns about does not apply.
#![allow(async_fn_in_trait)]

pub mod checkout;
pub mod error;
pub mod ports;
pub mod shift;

#[cfg(test)]
mod test_support;

pub use checkout::{CheckoutSession, PaymentDraft};
pub use error::{SessionError, SessionResult};
pub use ports::{
    AuditEvent, AuditSink, Catalog, Customers, PortError, SaleLineRecord, SaleRecord,
    TransactionStore,
};
pub use shift::ShiftManager;
