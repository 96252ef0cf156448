//! Criterion benchmarks for SignalKit hot paths.
//!
//! Benchmarks:
//! 1. SMA look-back over a most-recent-first series
//! 2. Crossover detector per-bar evaluation
//! 3. Parity timer per-bar evaluation
//! 4. Full session step (rule + display + condition + orders)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use signalkit_core::consumers::{
    ConditionConsumer, DisplayConsumer, OrderManager, PaperGateway,
};
use signalkit_core::domain::{Bar, Periodicity};
use signalkit_core::indicators::sma;
use signalkit_core::rules::{CrossoverDetector, ParityTimer, RuleSwitches, SignalRule};
use signalkit_core::session::SignalSession;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Bar::new(
                "SPY",
                base + chrono::Duration::minutes(i as i64),
                open,
                close + 1.5,
                open.min(close) - 1.5,
                close,
            )
        })
        .collect()
}

// ── 1. SMA ───────────────────────────────────────────────────────────

fn bench_sma(c: &mut Criterion) {
    let mut group = c.benchmark_group("sma");
    let series: Vec<f64> = make_bars(500).iter().rev().map(|b| b.close).collect();

    for window in [20usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| {
                let cur = sma(black_box(&series), w, 0).unwrap();
                let prev = sma(black_box(&series), w, 1).unwrap();
                black_box((cur, prev))
            })
        });
    }
    group.finish();
}

// ── 2–3. Rule evaluation ─────────────────────────────────────────────

fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_per_bar");
    let bars = make_bars(1000);

    group.bench_function("sma_crossover_20_50_1000_bars", |b| {
        b.iter(|| {
            let mut rule = CrossoverDetector::default_params();
            for bar in &bars {
                black_box(rule.evaluate(bar));
            }
        })
    });

    group.bench_function("parity_1000_bars", |b| {
        b.iter(|| {
            let mut rule = ParityTimer::new(RuleSwitches::default());
            for bar in &bars {
                black_box(rule.evaluate(bar));
            }
        })
    });
    group.finish();
}

// ── 4. Session step ──────────────────────────────────────────────────

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let bars = make_bars(1000);

    group.bench_function("crossover_all_consumers_1000_bars", |b| {
        b.iter(|| {
            let mut session = SignalSession::new(
                "bench",
                Box::new(CrossoverDetector::default_params()),
                Periodicity::minutes(1),
            )
            .with_display(DisplayConsumer::default())
            .with_condition(ConditionConsumer::new())
            .with_orders(OrderManager::new("bench", Box::new(PaperGateway::new())));
            for bar in &bars {
                black_box(session.on_bar(bar));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_sma, bench_rules, bench_session);
criterion_main!(benches);
