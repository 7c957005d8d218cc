use common::{InvoiceId, PaymentId, Version};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CaptureMode, EventMeta, Payment, PaymentEvent, PaymentKind};
use money::{CurrencyCode, Money};

fn usd(minor: i64) -> Money {
    Money::from_minor_units(CurrencyCode::new("USD").unwrap(), minor).unwrap()
}

fn bench_create_payment(c: &mut Criterion) {
    c.bench_function("domain/create_payment", |b| {
        b.iter(|| {
            Payment::new(
                PaymentId::new(),
                InvoiceId::new(),
                usd(10_000),
                PaymentKind::OneTime,
                CaptureMode::Manual,
            )
            .unwrap()
        });
    });
}

fn bench_full_command_cycle(c: &mut Criterion) {
    c.bench_function("domain/authorize_capture_refund", |b| {
        b.iter(|| {
            let mut p = Payment::new(
                PaymentId::new(),
                InvoiceId::new(),
                usd(10_000),
                PaymentKind::OneTime,
                CaptureMode::Manual,
            )
            .unwrap();
            p.authorize(&usd(10_000)).unwrap();
            p.capture(&usd(10_000)).unwrap();
            p.refund(&usd(10_000)).unwrap();
            p
        });
    });
}

fn capture_stream(n: u64) -> Vec<PaymentEvent> {
    let id = PaymentId::new();
    let mut events = vec![PaymentEvent::created(
        EventMeta::new(id, Version::first()),
        InvoiceId::new(),
        usd(100 * n as i64),
        PaymentKind::OneTime,
        CaptureMode::Immediate,
    )];
    for v in 2..=(n + 1) {
        events.push(PaymentEvent::paid(
            EventMeta::new(id, Version::new(v)),
            usd(100),
        ));
    }
    events
}

fn bench_rehydrate_50_events(c: &mut Criterion) {
    let events = capture_stream(50);
    c.bench_function("domain/rehydrate_50_events", |b| {
        b.iter(|| Payment::rehydrate(&events).unwrap());
    });
}

fn bench_rehydrate_100_events(c: &mut Criterion) {
    let events = capture_stream(100);
    c.bench_function("domain/rehydrate_100_events", |b| {
        b.iter(|| Payment::rehydrate(&events).unwrap());
    });
}

criterion_group!(
    benches,
    bench_create_payment,
    bench_full_command_cycle,
    bench_rehydrate_50_events,
    bench_rehydrate_100_events,
);
criterion_main!(benches);
