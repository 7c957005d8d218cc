//! Create-payment use case.

use std::collections::HashMap;

use common::{InvoiceId, PaymentId, Version};
use domain::{
    CancelReason, CaptureMode, FailureReason, Payment, PaymentError, PaymentKind, PaymentState,
};
use event_store::PaymentRepository;
use money::Money;

use crate::error::HandlerError;
use crate::provider::{CreatePaymentRequest, PaymentProvider, Provider, ProviderStatus};

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreateCommand {
    /// Caller-chosen id; a fresh one is generated when absent.
    pub payment_id: Option<PaymentId>,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub kind: PaymentKind,
    pub mode: CaptureMode,
    pub description: Option<String>,
    pub metadata: HashMap<String, String>,
    pub return_url: Option<String>,
}

/// Returned after successful payment creation.
///
/// `client_secret` goes to the caller only; it never appears in events.
#[derive(Debug, Clone)]
pub struct CreateResult {
    pub id: PaymentId,
    pub state: PaymentState,
    pub version: Version,
    pub provider: Provider,
    pub provider_id: String,
    pub client_secret: String,
}

/// Orchestrates payment creation: aggregate construction, the provider
/// call, status translation, invariants and the initial save.
pub struct CreateHandler<R, P> {
    repo: R,
    provider: P,
}

impl<R, P> CreateHandler<R, P>
where
    R: PaymentRepository,
    P: PaymentProvider,
{
    /// Creates a handler over the given repository and provider.
    pub fn new(repo: R, provider: P) -> Self {
        Self { repo, provider }
    }

    #[tracing::instrument(skip(self, cmd), fields(invoice_id = %cmd.invoice_id))]
    pub async fn handle(&self, cmd: CreateCommand) -> Result<CreateResult, HandlerError> {
        let payment_id = cmd.payment_id.unwrap_or_default();
        let mut payment = Payment::new(
            payment_id,
            cmd.invoice_id,
            cmd.amount.clone(),
            cmd.kind,
            cmd.mode,
        )?;

        // Default metadata always overrides caller metadata.
        let mut metadata = cmd.metadata;
        metadata.insert("payment_id".to_string(), payment.id().to_string());
        metadata.insert("invoice_id".to_string(), payment.invoice_id().to_string());
        metadata.insert("kind".to_string(), cmd.kind.as_str().to_string());
        metadata.insert("mode".to_string(), cmd.mode.as_str().to_string());

        let response = self
            .provider
            .create_payment(CreatePaymentRequest {
                payment_id: payment.id(),
                invoice_id: payment.invoice_id(),
                amount: cmd.amount.clone(),
                currency: cmd.amount.currency().as_str().to_string(),
                capture_manual: cmd.mode == CaptureMode::Manual,
                description: cmd.description,
                metadata,
                return_url: cmd.return_url,
                idempotency_key: payment.id().to_string(),
            })
            .await?;

        apply_provider_status(
            &mut payment,
            response.status,
            response.authorized.as_ref(),
            response.captured.as_ref(),
            &cmd.amount,
        )?;

        payment.invariants()?;
        self.repo.save(&mut payment, Version::initial()).await?;

        tracing::debug!(
            payment_id = %payment.id(),
            state = %payment.state(),
            provider = %response.provider,
            "payment created"
        );

        Ok(CreateResult {
            id: payment.id(),
            state: payment.state(),
            version: payment.version(),
            provider: response.provider,
            provider_id: response.provider_id,
            client_secret: response.client_secret,
        })
    }
}

/// Translates a normalized provider status into aggregate commands.
///
/// Pure: the single seam where provider idiosyncrasies cross into the
/// domain. `authorized`/`captured` are the provider-reported amounts,
/// falling back to the requested amount when absent.
pub fn apply_provider_status(
    payment: &mut Payment,
    status: ProviderStatus,
    authorized: Option<&Money>,
    captured: Option<&Money>,
    requested: &Money,
) -> Result<(), PaymentError> {
    match status {
        ProviderStatus::RequiresAction => payment.require_sca(),
        ProviderStatus::RequiresCapture => payment.authorize(authorized.unwrap_or(requested)),
        ProviderStatus::Succeeded => payment.capture(captured.unwrap_or(requested)),
        ProviderStatus::Canceled => payment.cancel(CancelReason::System),
        ProviderStatus::Failed => payment.fail(FailureReason::ProviderError),
        ProviderStatus::Pending | ProviderStatus::Unknown => Ok(()),
    }
}
