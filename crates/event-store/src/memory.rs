use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{PaymentId, Version};
use domain::{Payment, PaymentEvent};
use tokio::sync::RwLock;

use crate::error::EventStoreError;
use crate::repository::PaymentRepository;

#[derive(Default)]
struct Inner {
    /// Append-only event stream per payment.
    streams: HashMap<PaymentId, Vec<PaymentEvent>>,

    /// Last persisted version per payment.
    versions: HashMap<PaymentId, Version>,
}

/// In-memory event store for tests and development.
///
/// Version check and append run under one write lock, so conflicting writers
/// cannot interleave; a durable implementation gets the same atomicity from
/// a conditional write (`WHERE version = ?`).
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all payments.
    pub async fn event_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.streams.values().map(Vec::len).sum()
    }

    /// Returns the stored version for a payment, if any.
    pub async fn stored_version(&self, id: PaymentId) -> Option<Version> {
        self.inner.read().await.versions.get(&id).copied()
    }

    /// Returns a copy of the event stream for a payment.
    pub async fn events_for(&self, id: PaymentId) -> Vec<PaymentEvent> {
        self.inner
            .read()
            .await
            .streams
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Clears all streams and versions.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.streams.clear();
        inner.versions.clear();
    }
}

#[async_trait]
impl PaymentRepository for InMemoryEventStore {
    async fn load(&self, id: PaymentId) -> Result<Payment, EventStoreError> {
        let events = {
            let inner = self.inner.read().await;
            inner
                .streams
                .get(&id)
                .cloned()
                .ok_or(EventStoreError::NotFound(id))?
        };
        Ok(Payment::rehydrate(&events)?)
    }

    async fn save(
        &self,
        payment: &mut Payment,
        expected_version: Version,
    ) -> Result<(), EventStoreError> {
        payment.invariants()?;

        let id = payment.id();
        let mut inner = self.inner.write().await;

        let current = inner
            .versions
            .get(&id)
            .copied()
            .unwrap_or(Version::initial());
        if current != expected_version {
            return Err(EventStoreError::VersionConflict {
                payment_id: id,
                expected: expected_version,
                actual: current,
            });
        }

        let events = payment.uncommitted_events();
        if events.is_empty() {
            return Ok(());
        }

        // Append copies; callers keep no handle into the stored stream.
        let count = events.len() as u64;
        inner
            .streams
            .entry(id)
            .or_default()
            .extend(events.iter().cloned());
        inner.versions.insert(id, Version::new(current.as_u64() + count));
        drop(inner);

        // Commit point reached: the buffer is drained.
        payment.clear_uncommitted();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::InvoiceId;
    use domain::{CaptureMode, PaymentKind, PaymentState};
    use money::{CurrencyCode, Money};

    fn usd(minor: i64) -> Money {
        Money::from_minor_units(CurrencyCode::new("USD").unwrap(), minor).unwrap()
    }

    fn new_payment() -> Payment {
        Payment::new(
            PaymentId::new(),
            InvoiceId::new(),
            usd(1000),
            PaymentKind::OneTime,
            CaptureMode::Manual,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        payment.authorize(&usd(1000)).unwrap();
        let id = payment.id();

        store.save(&mut payment, Version::initial()).await.unwrap();
        assert!(payment.uncommitted_events().is_empty());
        assert_eq!(store.stored_version(id).await, Some(Version::new(2)));

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.state(), PaymentState::Authorized);
        assert_eq!(loaded.ledger(), payment.ledger());
        assert_eq!(loaded.version(), Version::new(2));
        assert!(loaded.uncommitted_events().is_empty());
    }

    #[tokio::test]
    async fn load_unknown_payment_fails() {
        let store = InMemoryEventStore::new();
        let id = PaymentId::new();
        assert_eq!(
            store.load(id).await.unwrap_err(),
            EventStoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn version_conflict_on_stale_expectation() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        let id = payment.id();
        store.save(&mut payment, Version::initial()).await.unwrap();

        // Two handlers load the same stream.
        let mut first = store.load(id).await.unwrap();
        let mut second = store.load(id).await.unwrap();

        first.authorize(&usd(400)).unwrap();
        store.save(&mut first, Version::first()).await.unwrap();

        second.authorize(&usd(500)).unwrap();
        let err = store.save(&mut second, Version::first()).await.unwrap_err();
        assert_eq!(
            err,
            EventStoreError::VersionConflict {
                payment_id: id,
                expected: Version::first(),
                actual: Version::new(2),
            }
        );
        // The loser keeps its buffer for the retry path.
        assert_eq!(second.uncommitted_events().len(), 1);

        // Reload-retry succeeds.
        let mut retried = store.load(id).await.unwrap();
        retried.authorize(&usd(500)).unwrap();
        store.save(&mut retried, Version::new(2)).await.unwrap();
        assert_eq!(store.stored_version(id).await, Some(Version::new(3)));
    }

    #[tokio::test]
    async fn sequential_saves_advance_by_event_count() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        let id = payment.id();
        store.save(&mut payment, Version::initial()).await.unwrap();

        payment.authorize(&usd(1000)).unwrap();
        payment.capture(&usd(400)).unwrap();
        payment.capture(&usd(600)).unwrap();
        store.save(&mut payment, Version::first()).await.unwrap();

        assert_eq!(store.stored_version(id).await, Some(Version::new(4)));
        assert_eq!(store.event_count().await, 4);
    }

    #[tokio::test]
    async fn save_without_events_is_a_noop() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        let id = payment.id();
        store.save(&mut payment, Version::initial()).await.unwrap();

        let mut loaded = store.load(id).await.unwrap();
        store.save(&mut loaded, Version::first()).await.unwrap();
        assert_eq!(store.stored_version(id).await, Some(Version::first()));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn save_rejects_invariant_violations() {
        use common::Version as V;
        use domain::{EventMeta, PaymentError, PaymentEvent};

        // A stream a buggy writer might produce: manual mode, paid with no
        // prior hold.
        let id = PaymentId::new();
        let events = vec![
            PaymentEvent::created(
                EventMeta::new(id, V::first()),
                InvoiceId::new(),
                usd(1000),
                PaymentKind::OneTime,
                CaptureMode::Manual,
            ),
            PaymentEvent::paid(EventMeta::new(id, V::new(2)), usd(1000)),
        ];
        let mut broken = Payment::rehydrate(&events).unwrap();

        let store = InMemoryEventStore::new();
        let err = store.save(&mut broken, Version::initial()).await.unwrap_err();
        assert_eq!(
            err,
            EventStoreError::Domain(PaymentError::PolicyCaptureMode)
        );
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn stored_events_are_isolated_from_the_caller() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        let id = payment.id();
        store.save(&mut payment, Version::initial()).await.unwrap();

        // Mutating the aggregate after save must not disturb the stream.
        payment.authorize(&usd(1000)).unwrap();
        assert_eq!(store.events_for(id).await.len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_the_store() {
        let store = InMemoryEventStore::new();
        let mut payment = new_payment();
        store.save(&mut payment, Version::initial()).await.unwrap();

        store.clear().await;
        assert_eq!(store.event_count().await, 0);
        assert!(store.load(payment.id()).await.is_err());
    }
}
