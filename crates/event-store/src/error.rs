use common::{PaymentId, Version};
use domain::PaymentError;
use thiserror::Error;

/// Errors that can occur when loading or saving payment aggregates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventStoreError {
    /// No event stream exists for the payment.
    #[error("payment not found: {0}")]
    NotFound(PaymentId),

    /// The stored version did not match the caller's expectation. Retryable
    /// by reloading and re-running the command.
    #[error("version conflict for payment {payment_id}: expected {expected}, found {actual}")]
    VersionConflict {
        payment_id: PaymentId,
        expected: Version,
        actual: Version,
    },

    /// The aggregate failed its invariants check, or its stream failed to
    /// replay.
    #[error(transparent)]
    Domain(#[from] PaymentError),
}
