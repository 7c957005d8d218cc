//! Payment provider port.
//!
//! Concrete adapters (HTTP/SDK plumbing) live outside this core; the port
//! defines the normalized shapes they must produce. Providers must treat
//! the request's `idempotency_key` as such, so handler retries after a
//! partial failure are absorbed on the provider side.

use std::collections::HashMap;

use async_trait::async_trait;
use common::{InvoiceId, PaymentId};
use money::Money;
use thiserror::Error;

/// Known provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Stripe,
    Tinkoff,
}

impl Provider {
    /// Returns the provider name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Stripe => "stripe",
            Provider::Tinkoff => "tinkoff",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized provider status after a create or refund call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Unknown,
    /// 3DS / SCA required.
    RequiresAction,
    /// Funds are held; capture must follow.
    RequiresCapture,
    Succeeded,
    /// Still in flight on the provider side.
    Pending,
    Canceled,
    Failed,
}

/// Failure reported by a provider adapter: network trouble, a rejected
/// request, a malformed response. Opaque to the domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error: {message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Creates a provider error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Input for creating a payment on the provider side.
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,

    /// ISO-4217 code, duplicated from `amount` for adapter convenience.
    pub currency: String,

    /// True for manual capture, false for automatic.
    pub capture_manual: bool,

    pub description: Option<String>,
    pub metadata: HashMap<String, String>,
    pub return_url: Option<String>,

    /// The payment id, verbatim. Providers must deduplicate on it.
    pub idempotency_key: String,
}

/// Provider response to a create call.
#[derive(Debug, Clone)]
pub struct CreatePaymentResponse {
    pub provider: Provider,

    /// Provider-side payment identity (e.g. a payment-intent id).
    pub provider_id: String,

    /// Returned to the API caller only; never recorded in events.
    pub client_secret: String,

    pub status: ProviderStatus,

    /// Set when the provider holds funds (requires capture).
    pub authorized: Option<Money>,

    /// Set when the provider captured immediately (succeeded).
    pub captured: Option<Money>,
}

/// Input for refunding a payment on the provider side.
#[derive(Debug, Clone)]
pub struct RefundPaymentRequest {
    pub payment_id: PaymentId,

    /// Provider-side payment identity the refund applies to.
    pub provider_id: String,

    pub amount: Money,

    /// ISO-4217 code, duplicated from `amount` for adapter convenience.
    pub currency: String,

    pub reason: String,
    pub metadata: HashMap<String, String>,

    /// `"{payment_id}_refund"`. Providers must deduplicate on it.
    pub idempotency_key: String,
}

/// Provider response to a refund call.
#[derive(Debug, Clone)]
pub struct RefundPaymentResponse {
    pub provider: Provider,

    /// Provider-side refund identity.
    pub refund_id: String,

    pub status: ProviderStatus,

    /// The amount the provider actually refunded, when reported.
    pub amount: Option<Money>,
}

/// Port to an external payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates (and possibly authorizes or captures) a payment.
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, ProviderError>;

    /// Refunds part or all of a captured payment.
    async fn refund_payment(
        &self,
        request: RefundPaymentRequest,
    ) -> Result<RefundPaymentResponse, ProviderError>;
}
