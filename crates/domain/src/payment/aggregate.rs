//! Payment aggregate implementation.

use common::{InvoiceId, PaymentId, Version};
use money::Money;

use crate::error::PaymentError;

use super::{
    CancelReason, CaptureMode, EventMeta, FailureReason, Guard, InvalidTransition, Ledger,
    PaymentEvent, PaymentKind, PaymentState, Policy, Trigger,
};

/// Payment aggregate root.
///
/// Owns identity, the monetary ledger, the flow state, the version counter
/// and the uncommitted event buffer. Commands validate first and mutate only
/// through [`PaymentEvent`]s, so a command that returns an error leaves the
/// aggregate exactly as it found it. Replay goes through the same `apply`
/// path the commands use.
///
/// One command executes on a given instance at a time; the aggregate itself
/// performs no I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    id: PaymentId,
    invoice_id: InvoiceId,

    kind: PaymentKind,
    capture_mode: CaptureMode,

    state: PaymentState,
    ledger: Ledger,
    version: Version,

    uncommitted: Vec<PaymentEvent>,
    policy: Policy,
}

impl Payment {
    /// Constructs a payment in the created state with the default policy,
    /// emitting `Created`.
    pub fn new(
        id: PaymentId,
        invoice_id: InvoiceId,
        amount: Money,
        kind: PaymentKind,
        capture_mode: CaptureMode,
    ) -> Result<Self, PaymentError> {
        Self::with_policy(id, invoice_id, amount, kind, capture_mode, Policy::default())
    }

    /// Constructs a payment with an explicit policy.
    pub fn with_policy(
        id: PaymentId,
        invoice_id: InvoiceId,
        amount: Money,
        kind: PaymentKind,
        capture_mode: CaptureMode,
        policy: Policy,
    ) -> Result<Self, PaymentError> {
        if id.is_nil() || invoice_id.is_nil() || !amount.is_positive() {
            return Err(PaymentError::InvalidArgs);
        }
        if !policy.is_currency_supported(amount.currency().as_str()) {
            return Err(PaymentError::UnsupportedCurrency(
                amount.currency().as_str().to_string(),
            ));
        }

        let mut payment = Self {
            id,
            invoice_id,
            kind,
            capture_mode,
            state: PaymentState::Created,
            ledger: Ledger::default(),
            version: Version::initial(),
            uncommitted: Vec::new(),
            policy,
        };

        let event = PaymentEvent::created(
            payment.next_meta(),
            invoice_id,
            amount,
            kind,
            capture_mode,
        );
        payment.apply(&event)?;
        payment.record(event);
        Ok(payment)
    }

    /// Reconstructs a payment by replaying its event stream in causal order.
    ///
    /// The stream must begin with `Created`. The rebuilt aggregate carries
    /// the default policy; callers that need a custom policy attach it with
    /// [`Payment::set_policy`] after loading.
    pub fn rehydrate(events: &[PaymentEvent]) -> Result<Self, PaymentError> {
        if !matches!(events.first(), Some(PaymentEvent::Created(_))) {
            return Err(PaymentError::InvariantViolation(
                "event stream must begin with PaymentCreated",
            ));
        }

        let mut payment = Self::blank();
        for event in events {
            payment.apply(event)?;
        }
        Ok(payment)
    }

    /// Replaces the policy. Intended for wiring right after rehydration;
    /// policies never change mid-lifecycle.
    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    fn blank() -> Self {
        Self {
            id: PaymentId::nil(),
            invoice_id: InvoiceId::nil(),
            kind: PaymentKind::OneTime,
            capture_mode: CaptureMode::Immediate,
            state: PaymentState::Created,
            ledger: Ledger::default(),
            version: Version::initial(),
            uncommitted: Vec::new(),
            policy: Policy::default(),
        }
    }
}

// Query methods
impl Payment {
    /// Returns the payment ID.
    pub fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the invoice ID.
    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    /// Returns the payment kind.
    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    /// Returns the capture mode.
    pub fn capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }

    /// Returns the current flow state.
    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Returns the monetary ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns the current version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns true if no further commands may run.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Events emitted since the last successful save.
    pub fn uncommitted_events(&self) -> &[PaymentEvent] {
        &self.uncommitted
    }

    /// Drains and returns the uncommitted event buffer.
    pub fn take_uncommitted(&mut self) -> Vec<PaymentEvent> {
        std::mem::take(&mut self.uncommitted)
    }

    /// Clears the uncommitted event buffer.
    pub fn clear_uncommitted(&mut self) {
        self.uncommitted.clear();
    }

    /// Builds metadata for the next event. The aggregate's own version only
    /// advances when the event is applied.
    fn next_meta(&self) -> EventMeta {
        EventMeta::new(self.id, self.version.next())
    }

    fn record(&mut self, event: PaymentEvent) {
        self.uncommitted.push(event);
    }
}

// Command methods
impl Payment {
    /// Requires strong customer authentication:
    /// Created -> WaitingForConfirmation.
    pub fn require_sca(&mut self) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        Guard::new(self.state).trigger(Trigger::ScaRequired)?;

        let event = PaymentEvent::waiting_for_confirmation(self.next_meta());
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Places or tops up a hold.
    ///
    /// From Created the guard moves to Authorized; from Authorized this is
    /// an incremental top-up and the guard is not consulted (self-loop).
    pub fn authorize(&mut self, amount: &Money) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        match self.state {
            PaymentState::Created => {
                Guard::new(self.state).trigger(Trigger::Authorize)?;
            }
            PaymentState::Authorized => {}
            state => {
                return Err(InvalidTransition {
                    state,
                    trigger: Trigger::Authorize,
                }
                .into());
            }
        }

        // Simulate the accumulation; nothing is mutated until apply.
        self.ledger.clone().authorize(amount)?;

        let event = PaymentEvent::authorized(self.next_meta(), amount.clone());
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Confirms SCA: WaitingForConfirmation -> Authorized, recording the
    /// confirmed hold.
    pub fn confirm(&mut self, amount: &Money) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        Guard::new(self.state).trigger(Trigger::Confirm)?;

        self.ledger.clone().authorize(amount)?;

        let event = PaymentEvent::authorized(self.next_meta(), amount.clone());
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Captures funds: Created | Authorized -> Paid.
    ///
    /// A further partial capture while already Paid stays within the
    /// capture limit and does not re-fire the guard (self-loop). Immediate
    /// capture from Created is subject to the policy gate.
    pub fn capture(&mut self, amount: &Money) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        match self.state {
            PaymentState::Created | PaymentState::Authorized => {
                Guard::new(self.state).trigger(Trigger::Capture)?;
            }
            PaymentState::Paid => {}
            state => {
                return Err(InvalidTransition {
                    state,
                    trigger: Trigger::Capture,
                }
                .into());
            }
        }

        self.ledger.clone().capture(amount)?;

        if self.state == PaymentState::Created
            && !self
                .policy
                .allow_immediate_capture(self.kind, self.capture_mode)
        {
            return Err(PaymentError::PolicyCaptureMode);
        }

        let event = PaymentEvent::paid(self.next_meta(), amount.clone());
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Refunds part or all of the captured total.
    ///
    /// A partial refund stays in Paid; a full refund moves to Refunded.
    /// Returns true when the refund completed the payment.
    pub fn refund(&mut self, amount: &Money) -> Result<bool, PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }

        // Simulate to learn the new total and whether it completes.
        let outcome = self.ledger.clone().refund(amount)?;
        if outcome.full {
            Guard::new(self.state).trigger(Trigger::RefundFull)?;
        }

        let event = PaymentEvent::refunded(
            self.next_meta(),
            amount.clone(),
            outcome.total_refunded,
            outcome.full,
        );
        self.apply(&event)?;
        self.record(event);
        Ok(outcome.full)
    }

    /// Records a failed refund attempt. State is unchanged; only the
    /// version advances.
    pub fn refund_failed(&mut self, reason: FailureReason) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }

        let event = PaymentEvent::refund_failed(self.next_meta(), reason);
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Cancels the payment: Created | WaitingForConfirmation | Authorized
    /// -> Canceled.
    pub fn cancel(&mut self, reason: CancelReason) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        Guard::new(self.state).trigger(Trigger::Cancel)?;

        let event = PaymentEvent::canceled(self.next_meta(), reason);
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }

    /// Fails the payment: Created | WaitingForConfirmation | Authorized
    /// -> Failed.
    pub fn fail(&mut self, reason: FailureReason) -> Result<(), PaymentError> {
        if self.is_terminal() {
            return Err(PaymentError::TerminalState);
        }
        Guard::new(self.state).trigger(Trigger::Fail)?;

        let event = PaymentEvent::failed(self.next_meta(), reason);
        self.apply(&event)?;
        self.record(event);
        Ok(())
    }
}

// Event application (shared by commands and replay)
impl Payment {
    /// Applies an event, updating state, ledger and version.
    ///
    /// Deterministic: the same state and event always produce the same new
    /// state. Commands validate before emitting, so an error here during
    /// live execution is unreachable; during replay it reports a corrupt
    /// stream instead of silently diverging.
    pub fn apply(&mut self, event: &PaymentEvent) -> Result<(), PaymentError> {
        match event {
            PaymentEvent::Created(data) => {
                if data.meta.payment_id.is_nil() || data.invoice_id.is_nil() {
                    return Err(PaymentError::InvalidArgs);
                }
                self.id = data.meta.payment_id;
                self.invoice_id = data.invoice_id;
                self.kind = data.kind;
                self.capture_mode = data.capture_mode;
                self.ledger = Ledger::new(data.amount.clone());
                self.state = PaymentState::Created;
            }

            PaymentEvent::WaitingForConfirmation(_) => {
                self.state = PaymentState::WaitingForConfirmation;
            }

            PaymentEvent::Authorized(data) => {
                // Incremental: accumulate onto the current hold.
                self.ledger.authorize(&data.authorized_amount)?;
                self.state = PaymentState::Authorized;
            }

            PaymentEvent::Paid(data) => {
                // Incremental: accumulate onto the captured total.
                self.ledger.capture(&data.captured_amount)?;
                self.state = PaymentState::Paid;
            }

            PaymentEvent::Refunded(data) => {
                // The event's total is authoritative.
                self.ledger.set_total_refunded(data.total_refunded.clone());
                self.state = if data.full {
                    PaymentState::Refunded
                } else {
                    PaymentState::Paid
                };
            }

            PaymentEvent::RefundFailed(_) => {
                // State unchanged; only the version advances below.
            }

            PaymentEvent::Canceled(_) => {
                self.state = PaymentState::Canceled;
            }

            PaymentEvent::Failed(_) => {
                self.state = PaymentState::Failed;
            }
        }

        self.version = event.version();
        Ok(())
    }

    /// Validates currency consistency and ledger bounds.
    ///
    /// Repository implementations must call this before persisting the
    /// aggregate.
    pub fn invariants(&self) -> Result<(), PaymentError> {
        let amount = self
            .ledger
            .amount()
            .ok_or(PaymentError::InvariantViolation("ledger amount is not set"))?;
        let currency = amount.currency();

        if !self.policy.is_currency_supported(currency.as_str()) {
            return Err(PaymentError::UnsupportedCurrency(
                currency.as_str().to_string(),
            ));
        }

        for total in [
            self.ledger.authorized(),
            self.ledger.captured(),
            self.ledger.total_refunded(),
        ]
        .into_iter()
        .flatten()
        {
            if total.currency() != currency {
                return Err(PaymentError::InvariantViolation(
                    "ledger totals do not share the charge currency",
                ));
            }
        }

        use std::cmp::Ordering;
        use super::LedgerError;

        if let Some(authorized) = self.ledger.authorized() {
            if authorized.compare(amount).map_err(LedgerError::Money)? == Ordering::Greater {
                return Err(PaymentError::InvariantViolation(
                    "authorized exceeds the charge amount",
                ));
            }
        }

        if let (Some(captured), Some(limit)) = (self.ledger.captured(), self.ledger.capture_limit())
        {
            if captured.compare(limit).map_err(LedgerError::Money)? == Ordering::Greater {
                return Err(PaymentError::InvariantViolation(
                    "captured exceeds the capture limit",
                ));
            }
        }

        if let (Some(refunded), Some(captured)) =
            (self.ledger.total_refunded(), self.ledger.captured())
        {
            if refunded.compare(captured).map_err(LedgerError::Money)? == Ordering::Greater {
                return Err(PaymentError::InvariantViolation(
                    "refunded exceeds the captured total",
                ));
            }
        }

        // A paid manual-mode payment with no recorded hold means an
        // immediate capture slipped past the policy gate.
        if self.state == PaymentState::Paid
            && self.capture_mode == CaptureMode::Manual
            && self.ledger.authorized().is_none()
        {
            return Err(PaymentError::PolicyCaptureMode);
        }

        Ok(())
    }
}

impl std::fmt::Display for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Payment{{id={}, state={}, version={}}}",
            self.id, self.state, self.version
        )
    }
}
