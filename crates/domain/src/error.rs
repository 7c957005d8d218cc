//! Domain error types.

use thiserror::Error;

use crate::payment::{InvalidTransition, LedgerError};

/// Errors that can occur during payment aggregate operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Nil payment id, nil invoice id, or a non-positive charge amount.
    #[error("payment: invalid arguments")]
    InvalidArgs,

    /// The flow guard rejected the transition.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The aggregate is in a terminal state; no command may run.
    #[error("payment: terminal state")]
    TerminalState,

    /// Immediate capture from the created state is forbidden by policy.
    #[error("payment: capture not allowed from created state in manual mode")]
    PolicyCaptureMode,

    /// Policy rejected the currency.
    #[error("payment: unsupported currency {0}")]
    UnsupportedCurrency(String),

    /// A structural invariant does not hold.
    #[error("payment: invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// A monetary bound or validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
