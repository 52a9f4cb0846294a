//! # Shift Manager
//!
//! Owns the active cash register for the session and drives its lifecycle
//! against persistence: `open_shift → withdraw/deposit/post → close_shift`.
//!
//! Every transition is computed on a working copy of the register, written
//! to the store, and only then committed to memory. A failed write leaves
//! the in-memory register exactly as it was - the transition is considered
//! not to have happened until the write succeeds.
//!
//! Methods take `&mut self`, so no two ledger-mutating calls can be in
//! flight against the same register; the UI disables the triggering control
//! until the prior call resolves.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use balcao_core::{CashMovement, CashMovementKind, CashRegister, ClosingSummary, Money, Operator};

use crate::error::{SessionError, SessionResult};
use crate::ports::{AuditEvent, AuditSink, TransactionStore};

// =============================================================================
// Shift Manager
// =============================================================================

/// The single owner of the active register instance.
///
/// A new `open_shift` creates a fresh register with a strictly increasing
/// shift number; after `close_shift` the frozen register stays readable
/// until the next open replaces it.
pub struct ShiftManager<S, A> {
    store: S,
    audit: A,
    register: Option<CashRegister>,
    last_shift_number: i64,
}

impl<S, A> ShiftManager<S, A>
where
    S: TransactionStore,
    A: AuditSink,
{
    /// Creates a manager. `last_shift_number` is seeded from persistence by
    /// the consuming application (0 for a brand-new store).
    pub fn new(store: S, audit: A, last_shift_number: i64) -> Self {
        ShiftManager {
            store,
            audit,
            register: None,
            last_shift_number,
        }
    }

    /// The current register, open or closed, if any.
    pub fn register(&self) -> Option<&CashRegister> {
        self.register.as_ref()
    }

    /// Mutable access to the open register, for posting sales at checkout.
    pub fn register_mut(&mut self) -> SessionResult<&mut CashRegister> {
        self.register
            .as_mut()
            .filter(|r| r.is_open())
            .ok_or(SessionError::NoActiveShift)
    }

    /// Opens a fresh register for a new shift, seeded with the opening
    /// float. Rejected while a shift is still open.
    pub async fn open_shift(
        &mut self,
        opening_balance: Money,
        operator: Operator,
    ) -> SessionResult<&CashRegister> {
        if let Some(register) = &self.register {
            if register.is_open() {
                return Err(SessionError::ShiftAlreadyOpen {
                    shift_number: register.shift_number,
                });
            }
        }

        let shift_number = self.last_shift_number + 1;
        let register = CashRegister::open(shift_number, opening_balance, operator, Utc::now())?;

        self.store.record_register_open(&register).await?;

        self.audit.log_event(AuditEvent {
            action: "register_opened".to_string(),
            entity_type: "register".to_string(),
            entity_id: register.id.clone(),
            old_values: None,
            new_values: Some(json!({
                "shiftNumber": shift_number,
                "openingBalanceCents": register.opening_balance_cents,
            })),
            reason: None,
        });
        info!(
            register_id = %register.id,
            shift_number,
            opening = register.opening_balance_cents,
            "Shift opened"
        );

        self.last_shift_number = shift_number;
        Ok(&*self.register.insert(register))
    }

    /// Records a manual withdrawal from the drawer.
    pub async fn withdraw(
        &mut self,
        amount: Money,
        reason: &str,
        operator: Operator,
    ) -> SessionResult<CashMovement> {
        self.apply_movement(CashMovementKind::Withdrawal, amount, reason, operator)
            .await
    }

    /// Records a manual deposit into the drawer.
    pub async fn deposit(
        &mut self,
        amount: Money,
        reason: &str,
        operator: Operator,
    ) -> SessionResult<CashMovement> {
        self.apply_movement(CashMovementKind::Deposit, amount, reason, operator)
            .await
    }

    async fn apply_movement(
        &mut self,
        kind: CashMovementKind,
        amount: Money,
        reason: &str,
        operator: Operator,
    ) -> SessionResult<CashMovement> {
        let register = self
            .register
            .as_ref()
            .filter(|r| r.is_open())
            .ok_or(SessionError::NoActiveShift)?;

        let mut working = register.clone();
        let movement = match kind {
            CashMovementKind::Withdrawal => working.withdraw(amount, reason, operator, Utc::now())?,
            CashMovementKind::Deposit => working.deposit(amount, reason, operator, Utc::now())?,
        };

        self.store.record_cash_movement(&movement).await?;
        self.register = Some(working);

        let action = match kind {
            CashMovementKind::Withdrawal => "cash_withdrawal",
            CashMovementKind::Deposit => "cash_deposit",
        };
        self.audit.log_event(AuditEvent {
            action: action.to_string(),
            entity_type: "cash_movement".to_string(),
            entity_id: movement.id.clone(),
            old_values: None,
            new_values: Some(json!({ "amountCents": movement.amount_cents })),
            reason: Some(movement.reason.clone()),
        });
        debug!(
            movement_id = %movement.id,
            amount = movement.amount_cents,
            ?kind,
            "Cash movement recorded"
        );

        Ok(movement)
    }

    /// Closes the shift against the physically counted cash and freezes the
    /// register. The signed difference is informational and never blocks
    /// the close.
    pub async fn close_shift(
        &mut self,
        counted: Money,
        operator: Operator,
    ) -> SessionResult<ClosingSummary> {
        let register = self
            .register
            .as_ref()
            .filter(|r| r.is_open())
            .ok_or(SessionError::NoActiveShift)?;

        let mut working = register.clone();
        let summary = working.close(counted, operator, Utc::now())?;

        self.store.record_register_close(&working).await?;

        self.audit.log_event(AuditEvent {
            action: "register_closed".to_string(),
            entity_type: "register".to_string(),
            entity_id: working.id.clone(),
            old_values: Some(json!({ "status": "open" })),
            new_values: Some(json!({
                "status": "closed",
                "expectedCents": summary.expected_cents,
                "countedCents": summary.counted_cents,
                "differenceCents": summary.difference_cents,
            })),
            reason: None,
        });
        info!(
            register_id = %working.id,
            expected = summary.expected_cents,
            counted = summary.counted_cents,
            difference = summary.difference_cents,
            "Shift closed"
        );

        self.register = Some(working);
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init_tracing, operator, MemAudit, MemStore};
    use std::sync::Arc;

    fn manager() -> ShiftManager<Arc<MemStore>, Arc<MemAudit>> {
        ShiftManager::new(Arc::new(MemStore::new()), Arc::new(MemAudit::new()), 0)
    }

    #[tokio::test]
    async fn test_open_withdraw_close_reconciles() {
        init_tracing();
        let store = Arc::new(MemStore::new());
        let audit = Arc::new(MemAudit::new());
        let mut shift = ShiftManager::new(store.clone(), audit.clone(), 0);

        shift
            .open_shift(Money::from_cents(10000), operator())
            .await
            .unwrap();
        shift
            .withdraw(Money::from_cents(2000), "Supplier payment", operator())
            .await
            .unwrap();

        let summary = shift
            .close_shift(Money::from_cents(8000), operator())
            .await
            .unwrap();
        assert_eq!(summary.expected_cents, 8000);
        assert_eq!(summary.difference_cents, 0);

        assert_eq!(store.opens().len(), 1);
        assert_eq!(store.movements().len(), 1);
        assert_eq!(store.closes().len(), 1);
        for action in ["register_opened", "cash_withdrawal", "register_closed"] {
            assert!(audit.actions().contains(&action.to_string()));
        }
    }

    #[tokio::test]
    async fn test_open_while_open_rejected() {
        let mut shift = manager();
        shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();

        let err = shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ShiftAlreadyOpen { shift_number: 1 }));
    }

    #[tokio::test]
    async fn test_shift_numbers_strictly_increase() {
        let mut shift = manager();

        let first = shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap()
            .shift_number;
        shift
            .close_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();
        let second = shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap()
            .shift_number;

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_movement_without_shift_rejected() {
        let mut shift = manager();
        let err = shift
            .withdraw(Money::from_cents(100), "Supplier payment", operator())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoActiveShift));
    }

    #[tokio::test]
    async fn test_close_twice_rejected() {
        let mut shift = manager();
        shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();
        shift
            .close_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();

        let err = shift
            .close_shift(Money::from_cents(5000), operator())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoActiveShift));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_register_unchanged() {
        let store = Arc::new(MemStore::new());
        let mut shift = ShiftManager::new(store.clone(), Arc::new(MemAudit::new()), 0);

        shift
            .open_shift(Money::from_cents(10000), operator())
            .await
            .unwrap();

        store.fail_next_write();
        let err = shift
            .withdraw(Money::from_cents(2000), "Supplier payment", operator())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Port(_)));

        // the withdrawal did not happen
        let register = shift.register().unwrap();
        assert!(register.movements.is_empty());
        assert_eq!(register.expected_cash().cents(), 10000);
        assert!(store.movements().is_empty());

        // a failed close leaves the register open
        store.fail_next_write();
        assert!(shift
            .close_shift(Money::from_cents(10000), operator())
            .await
            .is_err());
        assert!(shift.register().unwrap().is_open());
    }

    #[tokio::test]
    async fn test_register_mut_requires_open_shift() {
        let mut shift = manager();
        assert!(matches!(
            shift.register_mut().unwrap_err(),
            SessionError::NoActiveShift
        ));

        shift
            .open_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();
        assert!(shift.register_mut().is_ok());

        shift
            .close_shift(Money::from_cents(5000), operator())
            .await
            .unwrap();
        assert!(matches!(
            shift.register_mut().unwrap_err(),
            SessionError::NoActiveShift
        ));
    }
}
