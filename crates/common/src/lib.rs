//! Shared identifier and versioning types for the payment core.

mod types;

pub use types::{EventId, InvoiceId, PaymentId, Version};
