//! Reusable payment rules built on the specification combinators.

use crate::specification::{Specification, Unsatisfied, all, spec};

use super::{Payment, PaymentState};

/// A payment can be refunded while paid, or topped up while already
/// (partially) refunded bookkeeping-wise — i.e. in `Paid` or `Refunded`.
pub fn refundable() -> impl Specification<Payment> {
    spec(|p: &Payment| match p.state() {
        PaymentState::Paid | PaymentState::Refunded => Ok(()),
        state => Err(Unsatisfied::new(format!(
            "payment in state {state} is not refundable"
        ))),
    })
}

/// Sanity rules for a freshly constructed payment: identities present, a
/// positive charge amount, and the created state.
pub fn valid_for_creation() -> impl Specification<Payment> {
    all(vec![
        Box::new(spec(|p: &Payment| {
            if p.id().is_nil() {
                Err(Unsatisfied::new("payment id is required"))
            } else {
                Ok(())
            }
        })),
        Box::new(spec(|p: &Payment| {
            if p.invoice_id().is_nil() {
                Err(Unsatisfied::new("invoice id is required"))
            } else {
                Ok(())
            }
        })),
        Box::new(spec(|p: &Payment| match p.ledger().amount() {
            Some(amount) if amount.is_positive() => Ok(()),
            Some(_) => Err(Unsatisfied::new("charge amount must be positive")),
            None => Err(Unsatisfied::new("charge amount is required")),
        })),
        Box::new(spec(|p: &Payment| {
            if p.state() == PaymentState::Created {
                Ok(())
            } else {
                Err(Unsatisfied::new("payment is not in created state"))
            }
        })),
    ])
}
