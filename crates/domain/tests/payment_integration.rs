//! Integration tests for the payment aggregate.
//!
//! These tests exercise full lifecycles, replay determinism and the
//! serialized form of event streams.

use common::{InvoiceId, PaymentId, Version};
use domain::{
    CancelReason, CaptureMode, FailureReason, Payment, PaymentError, PaymentEvent, PaymentKind,
    PaymentState, Policy,
};
use money::{CurrencyCode, Money};

fn usd(minor: i64) -> Money {
    Money::from_minor_units(CurrencyCode::new("USD").unwrap(), minor).unwrap()
}

fn new_payment(amount_minor: i64, mode: CaptureMode) -> Payment {
    Payment::new(
        PaymentId::new(),
        InvoiceId::new(),
        usd(amount_minor),
        PaymentKind::OneTime,
        mode,
    )
    .unwrap()
}

mod lifecycle {
    use super::*;

    #[test]
    fn manual_capture_lifecycle_with_partial_refunds() {
        let mut p = new_payment(1000, CaptureMode::Manual);
        assert_eq!(p.state(), PaymentState::Created);
        assert_eq!(p.version(), Version::first());

        p.authorize(&usd(1000)).unwrap();
        p.capture(&usd(400)).unwrap();
        p.capture(&usd(600)).unwrap();
        assert_eq!(p.state(), PaymentState::Paid);
        assert_eq!(p.ledger().captured(), Some(&usd(1000)));

        assert!(!p.refund(&usd(300)).unwrap());
        assert!(p.refund(&usd(700)).unwrap());
        assert_eq!(p.state(), PaymentState::Refunded);
        assert_eq!(p.version(), Version::new(6));

        assert_eq!(p.refund(&usd(1)).unwrap_err(), PaymentError::TerminalState);
    }

    #[test]
    fn sca_lifecycle() {
        let mut p = new_payment(2500, CaptureMode::Manual);

        p.require_sca().unwrap();
        assert_eq!(p.state(), PaymentState::WaitingForConfirmation);

        p.confirm(&usd(2500)).unwrap();
        assert_eq!(p.state(), PaymentState::Authorized);

        p.capture(&usd(2500)).unwrap();
        assert_eq!(p.state(), PaymentState::Paid);
        assert!(p.invariants().is_ok());
    }

    #[test]
    fn cancel_at_various_stages() {
        let mut created = new_payment(1000, CaptureMode::Manual);
        created.cancel(CancelReason::User).unwrap();
        assert_eq!(created.state(), PaymentState::Canceled);

        let mut waiting = new_payment(1000, CaptureMode::Manual);
        waiting.require_sca().unwrap();
        waiting.cancel(CancelReason::Duplicate).unwrap();
        assert_eq!(waiting.state(), PaymentState::Canceled);

        let mut authorized = new_payment(1000, CaptureMode::Manual);
        authorized.authorize(&usd(1000)).unwrap();
        authorized.cancel(CancelReason::AuthVoid).unwrap();
        assert_eq!(authorized.state(), PaymentState::Canceled);

        // Once paid, cancel is no longer a legal exit.
        let mut paid = new_payment(1000, CaptureMode::Immediate);
        paid.capture(&usd(1000)).unwrap();
        assert!(matches!(
            paid.cancel(CancelReason::User).unwrap_err(),
            PaymentError::InvalidTransition(_)
        ));
    }

    #[test]
    fn fail_at_various_stages() {
        for reason in [
            FailureReason::Declined,
            FailureReason::AuthExpired,
            FailureReason::ProviderError,
        ] {
            let mut p = new_payment(1000, CaptureMode::Manual);
            p.fail(reason).unwrap();
            assert_eq!(p.state(), PaymentState::Failed);
            assert!(p.is_terminal());
        }
    }
}

mod replay {
    use super::*;

    #[test]
    fn refund_totals_replay_deterministically() {
        // Two partial refunds against captured 5.00: the emitted events
        // carry running totals 2.00 then 3.00.
        let mut p = new_payment(500, CaptureMode::Immediate);
        p.capture(&usd(500)).unwrap();
        p.refund(&usd(200)).unwrap();
        p.refund(&usd(100)).unwrap();

        let events = p.take_uncommitted();
        let totals: Vec<i64> = events
            .iter()
            .filter_map(|e| match e {
                PaymentEvent::Refunded(data) => Some(data.total_refunded.to_minor_units().unwrap()),
                _ => None,
            })
            .collect();
        assert_eq!(totals, vec![200, 300]);

        let replayed = Payment::rehydrate(&events).unwrap();
        assert_eq!(replayed.state(), PaymentState::Paid);
        assert_eq!(replayed.ledger().total_refunded(), Some(&usd(300)));
        assert_eq!(replayed.version(), p.version());
    }

    #[test]
    fn refund_failures_do_not_disturb_replay() {
        let mut p = new_payment(500, CaptureMode::Immediate);
        p.capture(&usd(500)).unwrap();
        p.refund(&usd(200)).unwrap();
        p.refund_failed(FailureReason::NetworkError).unwrap();
        p.refund_failed(FailureReason::ProviderError).unwrap();
        p.refund(&usd(300)).unwrap();

        let events = p.take_uncommitted();
        let replayed = Payment::rehydrate(&events).unwrap();

        assert_eq!(replayed.state(), PaymentState::Refunded);
        assert_eq!(replayed.ledger().total_refunded(), Some(&usd(500)));
        assert_eq!(replayed.version(), Version::new(6));
    }

    #[test]
    fn replay_through_serialized_stream() {
        let mut p = new_payment(1000, CaptureMode::Manual);
        p.authorize(&usd(1000)).unwrap();
        p.capture(&usd(750)).unwrap();
        p.refund(&usd(250)).unwrap();

        // Round-trip every event through its serialized representation, as
        // a durable store would.
        let stored: Vec<String> = p
            .uncommitted_events()
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect();
        let loaded: Vec<PaymentEvent> = stored
            .iter()
            .map(|json| serde_json::from_str(json).unwrap())
            .collect();

        let replayed = Payment::rehydrate(&loaded).unwrap();
        assert_eq!(replayed.id(), p.id());
        assert_eq!(replayed.state(), p.state());
        assert_eq!(replayed.ledger(), p.ledger());
        assert_eq!(replayed.version(), p.version());
    }

    #[test]
    fn rehydrated_aggregate_accepts_further_commands() {
        let mut p = new_payment(1000, CaptureMode::Manual);
        p.authorize(&usd(1000)).unwrap();
        let events = p.take_uncommitted();

        let mut loaded = Payment::rehydrate(&events).unwrap();
        loaded.set_policy(Policy::default());
        loaded.capture(&usd(1000)).unwrap();
        assert_eq!(loaded.state(), PaymentState::Paid);
        assert_eq!(loaded.version(), Version::new(3));
        assert_eq!(loaded.uncommitted_events().len(), 1);
    }
}
