//! Event persistence for payment aggregates.
//!
//! The [`PaymentRepository`] port loads aggregates by replaying their event
//! stream and saves them under optimistic concurrency: an append succeeds
//! only when the stored version matches the version the caller believes is
//! durable. [`InMemoryEventStore`] is the reference implementation; a
//! durable store provides the same contract with a conditional write.

mod error;
mod memory;
mod repository;

pub use error::EventStoreError;
pub use memory::InMemoryEventStore;
pub use repository::PaymentRepository;
