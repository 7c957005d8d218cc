//! Guard state machine for the payment flow.
//!
//! The guard is a validator only: it encodes which transitions are allowed
//! and nothing else. It does not emit events and does not touch the ledger.
//! Business policies (e.g. disallowing immediate capture in manual mode) are
//! enforced by the aggregate, not here.
//!
//! Refund semantics are explicit:
//! - a partial refund keeps the state in `Paid` (self-loop, no trigger),
//! - a full refund moves to `Refunded` (terminal) via [`Trigger::RefundFull`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The state of a payment in its lifecycle.
///
/// ```text
/// Created ──┬──► WaitingForConfirmation ──► Authorized ──► Paid ──► Refunded
///           │              │                    ▲  │
///           ├──────────────┼────────────────────┘  └─(partial refund: stays Paid)
///           │              │
///           └──────────────┴──► Canceled / Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentState {
    /// Payment exists; nothing has happened with the provider yet.
    #[default]
    Created,

    /// Strong customer authentication is pending.
    WaitingForConfirmation,

    /// Funds are on hold.
    Authorized,

    /// Funds have been captured (fully or partially refundable).
    Paid,

    /// Fully refunded (terminal).
    Refunded,

    /// Canceled before capture (terminal).
    Canceled,

    /// Failed (terminal).
    Failed,
}

impl PaymentState {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentState::Refunded | PaymentState::Canceled | PaymentState::Failed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Created => "created",
            PaymentState::WaitingForConfirmation => "waiting_for_confirmation",
            PaymentState::Authorized => "authorized",
            PaymentState::Paid => "paid",
            PaymentState::Refunded => "refunded",
            PaymentState::Canceled => "canceled",
            PaymentState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trigger names for the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Created -> WaitingForConfirmation
    ScaRequired,
    /// WaitingForConfirmation -> Authorized
    Confirm,
    /// Created -> Authorized (skip SCA)
    Authorize,
    /// Created | Authorized -> Paid (policy may restrict Created)
    Capture,
    /// Paid -> Refunded. Partial refunds do not trigger the guard at all.
    RefundFull,
    /// Created | WaitingForConfirmation | Authorized -> Canceled
    Cancel,
    /// Created | WaitingForConfirmation | Authorized -> Failed
    Fail,
}

impl Trigger {
    /// Returns the trigger name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::ScaRequired => "sca_required",
            Trigger::Confirm => "confirm",
            Trigger::Authorize => "authorize",
            Trigger::Capture => "capture",
            Trigger::RefundFull => "refund_full",
            Trigger::Cancel => "cancel",
            Trigger::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct Transition {
    trigger: Trigger,
    sources: &'static [PaymentState],
    target: PaymentState,
}

/// Canonical list of allowed transitions. No callbacks or side effects —
/// the aggregate owns event emission and mutation.
const TRANSITIONS: &[Transition] = &[
    Transition {
        trigger: Trigger::ScaRequired,
        sources: &[PaymentState::Created],
        target: PaymentState::WaitingForConfirmation,
    },
    Transition {
        trigger: Trigger::Confirm,
        sources: &[PaymentState::WaitingForConfirmation],
        target: PaymentState::Authorized,
    },
    Transition {
        trigger: Trigger::Authorize,
        sources: &[PaymentState::Created],
        target: PaymentState::Authorized,
    },
    Transition {
        trigger: Trigger::Capture,
        // Immediate capture from Created is graph-legal; the aggregate's
        // policy decides whether a particular payment may take it.
        sources: &[PaymentState::Authorized, PaymentState::Created],
        target: PaymentState::Paid,
    },
    Transition {
        trigger: Trigger::RefundFull,
        sources: &[PaymentState::Paid],
        target: PaymentState::Refunded,
    },
    Transition {
        trigger: Trigger::Cancel,
        sources: &[
            PaymentState::Created,
            PaymentState::WaitingForConfirmation,
            PaymentState::Authorized,
        ],
        target: PaymentState::Canceled,
    },
    Transition {
        trigger: Trigger::Fail,
        sources: &[
            PaymentState::Created,
            PaymentState::WaitingForConfirmation,
            PaymentState::Authorized,
        ],
        target: PaymentState::Failed,
    },
];

/// Error returned when a trigger is not allowed from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transition {trigger} is not allowed from state {state}")]
pub struct InvalidTransition {
    pub state: PaymentState,
    pub trigger: Trigger,
}

fn target_for(state: PaymentState, trigger: Trigger) -> Option<PaymentState> {
    TRANSITIONS
        .iter()
        .find(|t| t.trigger == trigger && t.sources.contains(&state))
        .map(|t| t.target)
}

/// Validates transitions from a current state.
///
/// The caller is responsible for providing a valid initial state; the guard
/// only encodes graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    current: PaymentState,
}

impl Guard {
    /// Builds a guard positioned at the given state.
    pub fn new(initial: PaymentState) -> Self {
        Self { current: initial }
    }

    /// Returns the current state.
    pub fn current(&self) -> PaymentState {
        self.current
    }

    /// Attempts to move along the given trigger, returning the new state.
    pub fn trigger(&mut self, trigger: Trigger) -> Result<PaymentState, InvalidTransition> {
        match target_for(self.current, trigger) {
            Some(next) => {
                self.current = next;
                Ok(next)
            }
            None => Err(InvalidTransition {
                state: self.current,
                trigger,
            }),
        }
    }

    /// Returns true if the given trigger is currently permitted.
    pub fn is_allowed(&self, trigger: Trigger) -> bool {
        target_for(self.current, trigger).is_some()
    }

    /// Lists all triggers permitted from the current state, in table order.
    pub fn allowed(&self) -> Vec<Trigger> {
        TRANSITIONS
            .iter()
            .filter(|t| t.sources.contains(&self.current))
            .map(|t| t.trigger)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [PaymentState; 7] = [
        PaymentState::Created,
        PaymentState::WaitingForConfirmation,
        PaymentState::Authorized,
        PaymentState::Paid,
        PaymentState::Refunded,
        PaymentState::Canceled,
        PaymentState::Failed,
    ];

    const ALL_TRIGGERS: [Trigger; 7] = [
        Trigger::ScaRequired,
        Trigger::Confirm,
        Trigger::Authorize,
        Trigger::Capture,
        Trigger::RefundFull,
        Trigger::Cancel,
        Trigger::Fail,
    ];

    /// The expected transition matrix, row per (state, trigger, target).
    fn expected(state: PaymentState, trigger: Trigger) -> Option<PaymentState> {
        use PaymentState::*;
        use Trigger::*;
        match (state, trigger) {
            (Created, ScaRequired) => Some(WaitingForConfirmation),
            (Created, Authorize) => Some(Authorized),
            (Created, Capture) => Some(Paid),
            (Created, Cancel) => Some(Canceled),
            (Created, Fail) => Some(Failed),
            (WaitingForConfirmation, Confirm) => Some(Authorized),
            (WaitingForConfirmation, Cancel) => Some(Canceled),
            (WaitingForConfirmation, Fail) => Some(Failed),
            (Authorized, Capture) => Some(Paid),
            (Authorized, Cancel) => Some(Canceled),
            (Authorized, Fail) => Some(Failed),
            (Paid, RefundFull) => Some(Refunded),
            _ => None,
        }
    }

    #[test]
    fn full_transition_matrix() {
        for state in ALL_STATES {
            for trigger in ALL_TRIGGERS {
                let mut guard = Guard::new(state);
                match expected(state, trigger) {
                    Some(target) => {
                        assert_eq!(
                            guard.trigger(trigger),
                            Ok(target),
                            "{state} --{trigger}--> {target} should be allowed"
                        );
                        assert_eq!(guard.current(), target);
                    }
                    None => {
                        assert_eq!(
                            guard.trigger(trigger),
                            Err(InvalidTransition { state, trigger }),
                            "{state} --{trigger}--> should be rejected"
                        );
                        assert_eq!(guard.current(), state, "failed trigger must not move");
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        for state in [
            PaymentState::Refunded,
            PaymentState::Canceled,
            PaymentState::Failed,
        ] {
            assert!(state.is_terminal());
            let guard = Guard::new(state);
            assert!(guard.allowed().is_empty());
            for trigger in ALL_TRIGGERS {
                assert!(!guard.is_allowed(trigger));
            }
        }
    }

    #[test]
    fn allowed_lists_match_is_allowed() {
        for state in ALL_STATES {
            let guard = Guard::new(state);
            let allowed = guard.allowed();
            for trigger in ALL_TRIGGERS {
                assert_eq!(allowed.contains(&trigger), guard.is_allowed(trigger));
            }
        }
    }

    #[test]
    fn created_allows_five_exits() {
        let guard = Guard::new(PaymentState::Created);
        let allowed = guard.allowed();
        assert_eq!(allowed.len(), 5);
        assert!(allowed.contains(&Trigger::ScaRequired));
        assert!(allowed.contains(&Trigger::Authorize));
        assert!(allowed.contains(&Trigger::Capture));
        assert!(allowed.contains(&Trigger::Cancel));
        assert!(allowed.contains(&Trigger::Fail));
    }

    #[test]
    fn display_names() {
        assert_eq!(PaymentState::WaitingForConfirmation.to_string(), "waiting_for_confirmation");
        assert_eq!(Trigger::ScaRequired.to_string(), "sca_required");
        assert_eq!(Trigger::RefundFull.to_string(), "refund_full");
    }
}
