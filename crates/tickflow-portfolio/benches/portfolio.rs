//! Benchmarks for the portfolio hot path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tickflow_core::traits::NullBus;
use tickflow_core::types::{SymbolId, Timestamp};
use tickflow_portfolio::{PortfolioManager, RiskLimits};

fn bench_can_execute(c: &mut Criterion) {
    let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);
    let _ = pm.set_risk_limit(SymbolId::new(0), RiskLimits::new(1_000, 500, 100_000.0));

    c.bench_function("can_execute", |b| {
        b.iter(|| black_box(pm.can_execute(SymbolId::new(0), black_box(100), black_box(50.0))));
    });
}

fn bench_on_fill(c: &mut Criterion) {
    let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);

    c.bench_function("on_fill", |b| {
        b.iter(|| {
            let _ = pm.on_fill(SymbolId::new(0), black_box(100), black_box(50.0));
        });
    });
}

fn bench_on_market_data(c: &mut Criterion) {
    let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);

    c.bench_function("on_market_data", |b| {
        b.iter(|| {
            let _ = pm.on_market_data(SymbolId::new(0), black_box(52.5));
        });
    });
}

fn bench_compute_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_metrics");

    for num_positions in [10u32, 50, 100, 500] {
        let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);
        for i in 0..num_positions {
            let _ = pm.on_fill(SymbolId::new(i), 100, 50.0);
            let _ = pm.on_market_data(SymbolId::new(i), 52.0);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(num_positions),
            &num_positions,
            |b, _| {
                b.iter(|| black_box(pm.compute_metrics()));
            },
        );
    }

    group.finish();
}

fn bench_trading_loop(c: &mut Criterion) {
    let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);
    let risk = RiskLimits::new(1_000, 500, 100_000.0);
    for i in 0..10u32 {
        let _ = pm.set_risk_limit(SymbolId::new(i), risk);
    }
    let mut bus = NullBus;

    let mut timestamp = 0i64;
    c.bench_function("trading_loop", |b| {
        b.iter(|| {
            // Typical loop: market data update, signal, fill.
            let _ = pm.on_market_data(SymbolId::new(0), 50.0 + (timestamp % 100) as f64 * 0.01);
            let _ = pm.on_signal(
                SymbolId::new(0),
                100,
                50.0,
                Timestamp::from_nanos(timestamp),
                &mut bus,
            );
            let _ = pm.on_fill(SymbolId::new(0), 100, 50.0);
            timestamp += 1;
        });
    });
}

fn bench_symbol_locality(c: &mut Criterion) {
    let mut group = c.benchmark_group("locality");

    let mut pm: PortfolioManager<1024> = PortfolioManager::new(1_000_000.0);

    group.bench_function("scattered_symbols", |b| {
        b.iter(|| {
            for id in [0u32, 100, 200, 300, 400] {
                let _ = pm.on_market_data(SymbolId::new(id), 50.0);
            }
        });
    });

    group.bench_function("contiguous_symbols", |b| {
        b.iter(|| {
            for id in 0u32..5 {
                let _ = pm.on_market_data(SymbolId::new(id), 50.0);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_can_execute,
    bench_on_fill,
    bench_on_market_data,
    bench_compute_metrics,
    bench_trading_loop,
    bench_symbol_locality
);
criterion_main!(benches);
