//! The monetary ledger of a payment.
//!
//! Four totals sharing one currency, with bounded accumulation:
//! `authorized <= amount`, `captured <= (authorized if some else amount)`,
//! `total_refunded <= captured`. Every operation validates positivity,
//! currency and scale before committing, and each bound violation carries
//! its own error kind.

use std::cmp::Ordering;

use money::{Money, MoneyError};
use thiserror::Error;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The charge amount is not set (blank ledger).
    #[error("ledger: amount is not set")]
    NilAmount,

    /// Operation input must be strictly positive.
    #[error("ledger: amount must be positive")]
    NonPositiveAmount,

    /// `authorized + delta` would exceed the charge amount.
    #[error("authorize: would exceed amount")]
    AuthorizeExceeds,

    /// `captured + delta` would exceed the capture limit.
    #[error("capture: would exceed limit")]
    CaptureExceedsLimit,

    /// Refund requested with nothing captured.
    #[error("refund: nothing captured")]
    RefundWithoutCapture,

    /// `total_refunded + delta` would exceed the captured total.
    #[error("refund: would exceed captured")]
    RefundExceeds,

    /// Currency mismatch, invalid scale, unknown currency or overflow.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Result of a successful refund accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundOutcome {
    /// The new refunded total after the operation.
    pub total_refunded: Money,

    /// True if the payment is now fully refunded
    /// (`total_refunded == captured`).
    pub full: bool,
}

/// Value object holding the monetary totals of a payment.
///
/// `amount` is the immutable charge target, set at creation. The
/// accumulators start unset and only ever grow. A default ledger is blank;
/// it exists solely so an aggregate can be rehydrated from its first event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    amount: Option<Money>,
    authorized: Option<Money>,
    captured: Option<Money>,
    total_refunded: Option<Money>,
}

impl Ledger {
    /// Creates a ledger for the given charge amount.
    pub fn new(amount: Money) -> Self {
        Self {
            amount: Some(amount),
            authorized: None,
            captured: None,
            total_refunded: None,
        }
    }

    /// The immutable charge target.
    pub fn amount(&self) -> Option<&Money> {
        self.amount.as_ref()
    }

    /// Cumulative hold.
    pub fn authorized(&self) -> Option<&Money> {
        self.authorized.as_ref()
    }

    /// Cumulative captured total.
    pub fn captured(&self) -> Option<&Money> {
        self.captured.as_ref()
    }

    /// Cumulative refunded total.
    pub fn total_refunded(&self) -> Option<&Money> {
        self.total_refunded.as_ref()
    }

    /// The ceiling for captures: `authorized` when a hold exists, else the
    /// charge amount.
    pub fn capture_limit(&self) -> Option<&Money> {
        self.authorized.as_ref().or(self.amount.as_ref())
    }

    /// Accumulates a hold. Requires `authorized + delta <= amount`.
    pub fn authorize(&mut self, delta: &Money) -> Result<(), LedgerError> {
        let amount = self.amount.as_ref().ok_or(LedgerError::NilAmount)?;
        validate_positive(delta)?;

        let current = match &self.authorized {
            Some(m) => m.clone(),
            None => Money::zero(amount.currency().clone()),
        };
        let next = current.add(delta)?;
        if next.compare(amount)? == Ordering::Greater {
            return Err(LedgerError::AuthorizeExceeds);
        }

        self.authorized = Some(next);
        Ok(())
    }

    /// Accumulates the captured total. Requires
    /// `captured + delta <= capture_limit`.
    pub fn capture(&mut self, delta: &Money) -> Result<(), LedgerError> {
        let amount = self.amount.as_ref().ok_or(LedgerError::NilAmount)?;
        validate_positive(delta)?;

        let current = match &self.captured {
            Some(m) => m.clone(),
            None => Money::zero(amount.currency().clone()),
        };
        let next = current.add(delta)?;

        let limit = self.authorized.as_ref().unwrap_or(amount);
        if next.compare(limit)? == Ordering::Greater {
            return Err(LedgerError::CaptureExceedsLimit);
        }

        self.captured = Some(next);
        Ok(())
    }

    /// Accumulates the refunded total. Requires a captured amount and
    /// `total_refunded + delta <= captured`.
    pub fn refund(&mut self, delta: &Money) -> Result<RefundOutcome, LedgerError> {
        let captured = self
            .captured
            .as_ref()
            .ok_or(LedgerError::RefundWithoutCapture)?;
        validate_positive(delta)?;

        let current = match &self.total_refunded {
            Some(m) => m.clone(),
            None => Money::zero(captured.currency().clone()),
        };
        let next = current.add(delta)?;
        if next.compare(captured)? == Ordering::Greater {
            return Err(LedgerError::RefundExceeds);
        }

        let full = next.compare(captured)? == Ordering::Equal;
        self.total_refunded = Some(next.clone());
        Ok(RefundOutcome {
            total_refunded: next,
            full,
        })
    }

    /// Amount still capturable: `capture_limit - captured`.
    pub fn remaining_to_capture(&self) -> Result<Money, LedgerError> {
        let limit = self.capture_limit().ok_or(LedgerError::NilAmount)?;
        let captured = match &self.captured {
            Some(m) => m.clone(),
            None => Money::zero(limit.currency().clone()),
        };
        Ok(limit.sub(&captured)?)
    }

    /// Amount still refundable: `captured - total_refunded`.
    pub fn refundable(&self) -> Result<Money, LedgerError> {
        let captured = self
            .captured
            .as_ref()
            .ok_or(LedgerError::RefundWithoutCapture)?;
        let refunded = match &self.total_refunded {
            Some(m) => m.clone(),
            None => Money::zero(captured.currency().clone()),
        };
        Ok(captured.sub(&refunded)?)
    }

    /// True once the refunded total equals the captured total.
    pub fn is_fully_refunded(&self) -> bool {
        match (&self.total_refunded, &self.captured) {
            (Some(refunded), Some(captured)) => {
                refunded.compare(captured) == Ok(Ordering::Equal)
            }
            _ => false,
        }
    }

    /// Replay hook: overwrites the refunded total with the value carried by
    /// a refund event. Event totals are authoritative so rehydration stays
    /// deterministic even across refund-failure events.
    pub(crate) fn set_total_refunded(&mut self, total: Money) {
        self.total_refunded = Some(total);
    }
}

fn validate_positive(delta: &Money) -> Result<(), LedgerError> {
    if !delta.is_positive() {
        return Err(LedgerError::NonPositiveAmount);
    }
    Ok(())
}
