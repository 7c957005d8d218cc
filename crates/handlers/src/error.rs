use common::PaymentId;
use domain::{PaymentError, PaymentState};
use event_store::EventStoreError;
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced by the use-case handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No payment exists for the given id.
    #[error("payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Refunds require the payment to be paid or already (partially)
    /// refunded.
    #[error("payment in state {state} is not refundable")]
    PaymentNotRefundable { state: PaymentState },

    /// The requested (or derived) refund amount is zero or negative.
    #[error("refund amount must be positive")]
    InvalidRefundAmount,

    /// A domain rule rejected the command.
    #[error(transparent)]
    Domain(#[from] PaymentError),

    /// The repository rejected the load or save. `VersionConflict` is
    /// retryable by reloading and re-running the command.
    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
