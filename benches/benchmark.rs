use criterion::{Criterion, criterion_group, criterion_main};
use order_wire::codec::{WireFormat, decode, encode};
use order_wire::orders::{Order, Side};
use std::hint::black_box;

fn sample_order() -> Order {
    Order {
        id: 1_000_042,
        price: 150.25,
        stop: 149.75,
        account: "DU12345".into(),
        exchange: "SMART".into(),
        security: "STK".into(),
        currency: "USD".into(),
        localsymbol: "AAPL".into(),
        comment: "rebalance, leg 1".into(),
        tif: "DAY".into(),
        date: 20240102,
        time: 93000,
        sec: 15,
        ..Order::new("AAPL", Side::Buy, 100)
    }
}

fn bench_codec(c: &mut Criterion) {
    let order = sample_order();
    let record = encode(&order).unwrap();
    let strict = WireFormat::strict();
    let plain = Order {
        comment: "rebalance leg 1".into(),
        ..order.clone()
    };
    let plain_record = strict.encode(&plain).unwrap();

    c.bench_function("encode 1 order", |b| b.iter(|| encode(black_box(&order))));
    c.bench_function("decode 1 escaped record", |b| {
        b.iter(|| decode(black_box(&record)))
    });
    c.bench_function("decode 1 strict record", |b| {
        b.iter(|| strict.decode(black_box(&plain_record)))
    });
}
criterion_group!(benches, bench_codec);
criterion_main!(benches);
