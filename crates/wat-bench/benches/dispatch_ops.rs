//! Criterion micro-benchmarks for event dispatch.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use wat_bench::sign_lines;
use wat_colors::translate_alternate_color_codes;
use wat_entity::SignChangeEvent;
use wat_event::{fire_sign_change, Registry};
use wat_test_utils::player;

/// Benchmark: dispatch with no callback registered (nothing is built).
fn bench_dispatch_unregistered(c: &mut Criterion) {
    let registry = Registry::new();
    let lines = sign_lines();
    c.bench_function("dispatch_unregistered", |b| {
        b.iter(|| black_box(fire_sign_change(&registry, None, Some(&lines)).unwrap()));
    });
}

/// Benchmark: dispatch to a trivial callback.
fn bench_dispatch_noop(c: &mut Criterion) {
    let registry = Registry::new();
    registry.register::<SignChangeEvent, _>(|_| {});
    let p = player("alex", 1);
    let lines = sign_lines();
    c.bench_function("dispatch_noop", |b| {
        b.iter(|| black_box(fire_sign_change(&registry, Some(&p), Some(&lines)).unwrap()));
    });
}

/// Benchmark: dispatch through the color-code plugin.
fn bench_dispatch_colors(c: &mut Criterion) {
    let registry = Registry::new();
    wat_colors::install(&registry);
    let p = player("alex", 1);
    let lines = sign_lines();
    c.bench_function("dispatch_colors", |b| {
        b.iter(|| black_box(fire_sign_change(&registry, Some(&p), Some(&lines)).unwrap()));
    });
}

/// Benchmark: translate one line.
fn bench_translate_line(c: &mut Criterion) {
    c.bench_function("translate_line", |b| {
        b.iter(|| black_box(translate_alternate_color_codes(black_box("&4[Shop] &lDiamond &&1"))));
    });
}

criterion_group!(
    benches,
    bench_dispatch_unregistered,
    bench_dispatch_noop,
    bench_dispatch_colors,
    bench_translate_line
);
criterion_main!(benches);
