//! Use-case handlers for the payment core.
//!
//! Handlers coordinate the aggregate, the external payment provider and the
//! event repository. They are the only place where I/O happens; all
//! aggregate mutation in between is synchronous and in-memory, so dropping
//! a handler future before its provider call aborts with no state change.

pub mod create;
pub mod error;
pub mod provider;
pub mod refund;

pub use create::{CreateCommand, CreateHandler, CreateResult};
pub use error::HandlerError;
pub use provider::{
    CreatePaymentRequest, CreatePaymentResponse, PaymentProvider, Provider, ProviderError,
    ProviderStatus, RefundPaymentRequest, RefundPaymentResponse,
};
pub use refund::{RefundCommand, RefundHandler, RefundResult};
