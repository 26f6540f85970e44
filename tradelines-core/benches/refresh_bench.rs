//! Criterion benchmarks for the per-tick hot path.
//!
//! Every reference-price tick recomputes PnL, re-resolves styles, and
//! pushes a refresh for each open order; this must stay cheap enough to
//! run on every price update.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradelines_core::{
    calculate_pnl, NullSurface, Order, OrderDraft, OrderEngine, OrderId, OrderKind, OrderSide,
    OrderStatus,
};

fn engine_with_orders(n: usize) -> OrderEngine<NullSurface> {
    let mut engine = OrderEngine::new(NullSurface::new());
    for i in 0..n {
        let kind = match i % 4 {
            0 => OrderKind::Entry,
            1 => OrderKind::Limit,
            2 => OrderKind::StopLoss,
            _ => OrderKind::TakeProfit,
        };
        let side = if i % 2 == 0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let mut draft = OrderDraft::new(kind, side, 100.0 + i as f64, 1.0, "BENCH");
        draft.entry_price = Some(100.0);
        if i % 3 == 0 {
            draft.status = Some(OrderStatus::Filled);
        }
        engine.add_order(draft).unwrap();
    }
    engine
}

fn bench_reference_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_tick");
    for n in [4usize, 32, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut engine = engine_with_orders(n);
            let mut price = 100.0;
            b.iter(|| {
                price += 0.25;
                engine.set_reference_price(black_box(price));
            });
        });
    }
    group.finish();
}

fn bench_calculate_pnl(c: &mut Criterion) {
    let mut draft = OrderDraft::new(OrderKind::Entry, OrderSide::Buy, 100.0, 2.0, "BENCH");
    draft.entry_price = Some(100.0);
    draft.status = Some(OrderStatus::Filled);
    draft.fill_price = Some(100.5);
    draft.fees = Some(0.1);
    let order = Order::from_draft(OrderId::new("bench"), draft, chrono::Utc::now());

    c.bench_function("calculate_pnl", |b| {
        b.iter(|| calculate_pnl(black_box(&order), black_box(110.0)))
    });
}

fn bench_sorted_snapshot(c: &mut Criterion) {
    let engine = engine_with_orders(256);
    c.bench_function("orders_sorted_256", |b| b.iter(|| black_box(engine.orders())));
}

criterion_group!(
    benches,
    bench_reference_tick,
    bench_calculate_pnl,
    bench_sorted_snapshot
);
criterion_main!(benches);
