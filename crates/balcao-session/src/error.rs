//! # Session Error Types
//!
//! What the UI layer sees when a session operation fails.
//!
//! ## Error Flow
//! ```text
//! ValidationError ─► CoreError ──┐
//!                                ├─► SessionError ─► UI layer
//! PortError (collaborators) ─────┘
//! ```
//!
//! External-collaborator failures are propagated as-is: the session never
//! retries, never partially commits, and leaves in-memory state unchanged
//! when a persistence write tied to a ledger transition fails.

use thiserror::Error;

use balcao_core::CoreError;

use crate::ports::PortError;

/// Session-layer errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Business rule or state-machine violation from the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// External collaborator failure (catalog, customers, persistence).
    #[error(transparent)]
    Port(#[from] PortError),

    /// A register operation was attempted with no open shift.
    #[error("No active shift")]
    NoActiveShift,

    /// `open_shift` was called while a shift is already open.
    #[error("A shift is already open (shift #{shift_number})")]
    ShiftAlreadyOpen { shift_number: i64 },

    /// Checkout was confirmed on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,
}

/// Convenience type alias for Results with SessionError.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_converts() {
        let err: SessionError = CoreError::RegisterNotOpen.into();
        assert!(matches!(err, SessionError::Core(_)));
        assert_eq!(err.to_string(), "Register is not open");
    }

    #[test]
    fn test_shift_already_open_message() {
        let err = SessionError::ShiftAlreadyOpen { shift_number: 7 };
        assert_eq!(err.to_string(), "A shift is already open (shift #7)");
    }
}
