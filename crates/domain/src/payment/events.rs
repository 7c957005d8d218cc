//! Payment domain events.

use chrono::{DateTime, Utc};
use common::{EventId, InvoiceId, PaymentId, Version};
use money::Money;
use serde::{Deserialize, Serialize};

/// Billing shape of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    /// Single charge.
    OneTime,

    /// Part of a subscription schedule.
    Recurring,
}

impl PaymentKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::OneTime => "one_time",
            PaymentKind::Recurring => "recurring",
        }
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How captured funds are taken after authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    /// Capture at charge time, without a separate hold step.
    Immediate,

    /// Hold first; capture later by an explicit call.
    Manual,
}

impl CaptureMode {
    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Immediate => "immediate",
            CaptureMode::Manual => "manual",
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a payment was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    User,
    System,
    AuthVoid,
    Duplicate,
}

/// Why a payment or refund failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Declined,
    Reversed,
    AuthExpired,
    NetworkError,
    ProviderError,
}

/// Metadata common to every payment event.
///
/// `event_id` is assigned by the outbox/publisher layer, never by the
/// aggregate, so it is optional here and omitted from serialization until
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    /// The payment this event belongs to.
    pub payment_id: PaymentId,

    /// The aggregate version after this event.
    pub version: Version,

    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,

    /// Publisher-assigned event identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

impl EventMeta {
    /// Creates metadata stamped with the current time.
    pub fn new(payment_id: PaymentId, version: Version) -> Self {
        Self {
            payment_id,
            version,
            occurred_at: Utc::now(),
            event_id: None,
        }
    }
}

/// Events that can occur on a payment aggregate.
///
/// `Authorized` and `Paid` carry incremental deltas and replay additively.
/// `Refunded` carries both the delta and the new total; replay overwrites
/// with the total, which keeps rehydration deterministic in the presence of
/// `RefundFailed` events that bump the version without changing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    /// Payment was created.
    Created(CreatedData),

    /// Strong customer authentication is required.
    WaitingForConfirmation(WaitingForConfirmationData),

    /// A hold was placed (incremental delta).
    Authorized(AuthorizedData),

    /// Funds were captured (incremental delta).
    Paid(PaidData),

    /// A refund succeeded (delta plus authoritative new total).
    Refunded(RefundedData),

    /// A refund attempt failed; version bump only, no state change.
    RefundFailed(RefundFailedData),

    /// Payment was canceled.
    Canceled(CanceledData),

    /// Payment failed.
    Failed(FailedData),
}

impl PaymentEvent {
    /// Returns the event type name, used for store filtering and logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Created(_) => "PaymentCreated",
            PaymentEvent::WaitingForConfirmation(_) => "PaymentWaitingForConfirmation",
            PaymentEvent::Authorized(_) => "PaymentAuthorized",
            PaymentEvent::Paid(_) => "PaymentPaid",
            PaymentEvent::Refunded(_) => "PaymentRefunded",
            PaymentEvent::RefundFailed(_) => "PaymentRefundFailed",
            PaymentEvent::Canceled(_) => "PaymentCanceled",
            PaymentEvent::Failed(_) => "PaymentFailed",
        }
    }

    /// Returns the event metadata.
    pub fn meta(&self) -> &EventMeta {
        match self {
            PaymentEvent::Created(d) => &d.meta,
            PaymentEvent::WaitingForConfirmation(d) => &d.meta,
            PaymentEvent::Authorized(d) => &d.meta,
            PaymentEvent::Paid(d) => &d.meta,
            PaymentEvent::Refunded(d) => &d.meta,
            PaymentEvent::RefundFailed(d) => &d.meta,
            PaymentEvent::Canceled(d) => &d.meta,
            PaymentEvent::Failed(d) => &d.meta,
        }
    }

    /// The payment this event belongs to.
    pub fn payment_id(&self) -> PaymentId {
        self.meta().payment_id
    }

    /// The aggregate version after this event.
    pub fn version(&self) -> Version {
        self.meta().version
    }
}

/// Data for the `Created` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedData {
    pub meta: EventMeta,

    /// The invoice this payment settles.
    pub invoice_id: InvoiceId,

    /// The immutable charge target.
    pub amount: Money,

    pub kind: PaymentKind,

    pub capture_mode: CaptureMode,
}

/// Data for the `WaitingForConfirmation` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingForConfirmationData {
    pub meta: EventMeta,
}

/// Data for the `Authorized` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedData {
    pub meta: EventMeta,

    /// The incremental hold delta, not the cumulative total.
    pub authorized_amount: Money,
}

/// Data for the `Paid` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidData {
    pub meta: EventMeta,

    /// The incremental captured delta, not the cumulative total.
    pub captured_amount: Money,
}

/// Data for the `Refunded` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundedData {
    pub meta: EventMeta,

    /// The delta refunded by this operation.
    pub refund_amount: Money,

    /// The new cumulative refunded total. Authoritative on replay.
    pub total_refunded: Money,

    /// True if the payment is now fully refunded.
    pub full: bool,
}

/// Data for the `RefundFailed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundFailedData {
    pub meta: EventMeta,

    pub reason: FailureReason,
}

/// Data for the `Canceled` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanceledData {
    pub meta: EventMeta,

    pub reason: CancelReason,
}

/// Data for the `Failed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedData {
    pub meta: EventMeta,

    pub reason: FailureReason,
}

// Convenience constructors for events
impl PaymentEvent {
    /// Creates a `Created` event.
    pub fn created(
        meta: EventMeta,
        invoice_id: InvoiceId,
        amount: Money,
        kind: PaymentKind,
        capture_mode: CaptureMode,
    ) -> Self {
        PaymentEvent::Created(CreatedData {
            meta,
            invoice_id,
            amount,
            kind,
            capture_mode,
        })
    }

    /// Creates a `WaitingForConfirmation` event.
    pub fn waiting_for_confirmation(meta: EventMeta) -> Self {
        PaymentEvent::WaitingForConfirmation(WaitingForConfirmationData { meta })
    }

    /// Creates an `Authorized` event carrying an incremental delta.
    pub fn authorized(meta: EventMeta, authorized_amount: Money) -> Self {
        PaymentEvent::Authorized(AuthorizedData {
            meta,
            authorized_amount,
        })
    }

    /// Creates a `Paid` event carrying an incremental delta.
    pub fn paid(meta: EventMeta, captured_amount: Money) -> Self {
        PaymentEvent::Paid(PaidData {
            meta,
            captured_amount,
        })
    }

    /// Creates a `Refunded` event carrying the delta and the new total.
    pub fn refunded(meta: EventMeta, refund_amount: Money, total_refunded: Money, full: bool) -> Self {
        PaymentEvent::Refunded(RefundedData {
            meta,
            refund_amount,
            total_refunded,
            full,
        })
    }

    /// Creates a `RefundFailed` event.
    pub fn refund_failed(meta: EventMeta, reason: FailureReason) -> Self {
        PaymentEvent::RefundFailed(RefundFailedData { meta, reason })
    }

    /// Creates a `Canceled` event.
    pub fn canceled(meta: EventMeta, reason: CancelReason) -> Self {
        PaymentEvent::Canceled(CanceledData { meta, reason })
    }

    /// Creates a `Failed` event.
    pub fn failed(meta: EventMeta, reason: FailureReason) -> Self {
        PaymentEvent::Failed(FailedData { meta, reason })
    }
}
