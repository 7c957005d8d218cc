//! Refund-payment use case.

use std::collections::HashMap;

use common::{PaymentId, Version};
use domain::payment::refundable;
use domain::specification::Specification;
use domain::{FailureReason, PaymentState};
use event_store::{EventStoreError, PaymentRepository};
use money::Money;

use crate::error::HandlerError;
use crate::provider::{PaymentProvider, RefundPaymentRequest};

/// Input for refunding a payment.
#[derive(Debug, Clone)]
pub struct RefundCommand {
    pub payment_id: PaymentId,

    /// Refund amount; the full remaining refundable amount when absent.
    pub amount: Option<Money>,

    pub reason: String,
    pub metadata: HashMap<String, String>,
}

/// Returned after successful refund initiation.
#[derive(Debug, Clone)]
pub struct RefundResult {
    pub payment_id: PaymentId,
    pub refund_id: String,
    pub refund_amount: Money,
    pub total_refunded: Money,
    pub full: bool,
    pub state: PaymentState,
    pub version: Version,
}

/// Orchestrates payment refunds, including the provider-failure bookkeeping
/// path.
pub struct RefundHandler<R, P> {
    repo: R,
    provider: P,
}

impl<R, P> RefundHandler<R, P>
where
    R: PaymentRepository,
    P: PaymentProvider,
{
    /// Creates a handler over the given repository and provider.
    pub fn new(repo: R, provider: P) -> Self {
        Self { repo, provider }
    }

    #[tracing::instrument(skip(self, cmd), fields(payment_id = %cmd.payment_id))]
    pub async fn handle(&self, cmd: RefundCommand) -> Result<RefundResult, HandlerError> {
        let mut payment = match self.repo.load(cmd.payment_id).await {
            Ok(payment) => payment,
            Err(EventStoreError::NotFound(id)) => {
                return Err(HandlerError::PaymentNotFound(id));
            }
            Err(err) => return Err(err.into()),
        };

        if refundable().is_satisfied_by(&payment).is_err() {
            return Err(HandlerError::PaymentNotRefundable {
                state: payment.state(),
            });
        }

        // The version the store holds right now; both the success and the
        // failure save below run against it.
        let expected_version = payment.version();

        let refund_amount = match cmd.amount {
            Some(amount) => amount,
            None => payment
                .ledger()
                .refundable()
                .map_err(domain::PaymentError::from)?,
        };
        if !refund_amount.is_positive() {
            return Err(HandlerError::InvalidRefundAmount);
        }

        let mut metadata = cmd.metadata;
        metadata.insert("payment_id".to_string(), cmd.payment_id.to_string());
        metadata.insert("refund_reason".to_string(), cmd.reason.clone());

        let request = RefundPaymentRequest {
            payment_id: cmd.payment_id,
            // TODO: thread the provider payment id through the aggregate
            // once creation events carry it.
            provider_id: String::new(),
            amount: refund_amount.clone(),
            currency: refund_amount.currency().as_str().to_string(),
            reason: cmd.reason,
            metadata,
            idempotency_key: format!("{}_refund", cmd.payment_id),
        };

        let response = match self.provider.refund_payment(request).await {
            Ok(response) => response,
            Err(provider_err) => {
                // Integration failure: record it on the stream, then
                // surface the underlying error.
                tracing::warn!(
                    payment_id = %cmd.payment_id,
                    error = %provider_err,
                    "provider refund failed"
                );
                payment.refund_failed(FailureReason::NetworkError)?;
                self.repo.save(&mut payment, expected_version).await?;
                return Err(provider_err.into());
            }
        };

        // Prefer the amount the provider actually refunded.
        let actual_amount = response.amount.unwrap_or(refund_amount);
        let full = payment.refund(&actual_amount)?;

        payment.invariants()?;
        self.repo.save(&mut payment, expected_version).await?;

        let total_refunded = payment
            .ledger()
            .total_refunded()
            .cloned()
            .ok_or(domain::PaymentError::InvariantViolation(
                "refund recorded no total",
            ))?;

        tracing::debug!(
            payment_id = %payment.id(),
            full,
            state = %payment.state(),
            "refund applied"
        );

        Ok(RefundResult {
            payment_id: payment.id(),
            refund_id: response.refund_id,
            refund_amount: actual_amount,
            total_refunded,
            full,
            state: payment.state(),
            version: payment.version(),
        })
    }
}
