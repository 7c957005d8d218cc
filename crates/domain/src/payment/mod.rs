//! Payment aggregate and related types.

mod aggregate;
mod events;
mod flow;
mod ledger;
mod policy;
mod rules;

pub use aggregate::Payment;
pub use events::{
    AuthorizedData, CancelReason, CanceledData, CaptureMode, CreatedData, EventMeta, FailedData,
    FailureReason, PaidData, PaymentEvent, PaymentKind, RefundFailedData, RefundedData,
    WaitingForConfirmationData,
};
pub use flow::{Guard, InvalidTransition, PaymentState, Trigger};
pub use ledger::{Ledger, LedgerError, RefundOutcome};
pub use policy::Policy;
pub use rules::{refundable, valid_for_creation};
