use async_trait::async_trait;
use common::{PaymentId, Version};
use domain::Payment;

use crate::error::EventStoreError;

/// Persistence port for payment aggregates.
///
/// `save` is the commit point: it must persist the aggregate's uncommitted
/// events atomically, conditional on the stored version, and drain the
/// buffer only on success. Implementations must reject aggregates that fail
/// [`Payment::invariants`].
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Loads a payment by replaying all of its events in causal order.
    ///
    /// Returns [`EventStoreError::NotFound`] if no stream exists.
    async fn load(&self, id: PaymentId) -> Result<Payment, EventStoreError>;

    /// Appends the aggregate's uncommitted events.
    ///
    /// `expected_version` is the version the caller believes is durable:
    /// `0` for a new aggregate, otherwise the version observed at load
    /// time. On mismatch the save fails with
    /// [`EventStoreError::VersionConflict`] and nothing is written.
    async fn save(
        &self,
        payment: &mut Payment,
        expected_version: Version,
    ) -> Result<(), EventStoreError>;
}
