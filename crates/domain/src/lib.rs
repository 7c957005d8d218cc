//! Domain layer for the payment core.
//!
//! This crate provides:
//! - the `Payment` aggregate: commands, event application, invariants
//! - the flow guard: a declarative table of legal state transitions
//! - the ledger: bounded monetary accumulation
//! - injectable business policy and specification combinators

pub mod error;
pub mod payment;
pub mod specification;

pub use error::PaymentError;
pub use payment::{
    CancelReason, CaptureMode, EventMeta, FailureReason, Guard, InvalidTransition, Ledger,
    LedgerError, Payment, PaymentEvent, PaymentKind, PaymentState, Policy, RefundOutcome, Trigger,
};
