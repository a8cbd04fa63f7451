//! Criterion benchmarks for maya-core scalar primitives.
//!
//! Run with: cargo bench -p maya-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use maya_core::{SmoothedParam, sin_turns, soft_knee_limit};

const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_soft_knee_limit(c: &mut Criterion) {
    let mut group = c.benchmark_group("soft_knee_limit");
    for &block_size in BLOCK_SIZES {
        let input: Vec<f64> = (0..block_size).map(|i| (i as f64 * 0.01).sin() * 1.3).collect();
        group.bench_with_input(BenchmarkId::new("process", block_size), &block_size, |b, _| {
            b.iter(|| {
                for &sample in &input {
                    black_box(soft_knee_limit(black_box(sample)));
                }
            });
        });
    }
    group.finish();
}

fn bench_sin_turns(c: &mut Criterion) {
    let mut group = c.benchmark_group("sin_turns");
    for &block_size in BLOCK_SIZES {
        let phases: Vec<f64> = (0..block_size).map(|i| (i as f64) / block_size as f64).collect();
        group.bench_with_input(BenchmarkId::new("process", block_size), &block_size, |b, _| {
            b.iter(|| {
                for &phase in &phases {
                    black_box(sin_turns(black_box(phase)));
                }
            });
        });
    }
    group.finish();
}

fn bench_smoothed_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("SmoothedParam");
    for &block_size in BLOCK_SIZES {
        group.bench_with_input(BenchmarkId::new("advance", block_size), &block_size, |b, &size| {
            b.iter(|| {
                let mut param = SmoothedParam::with_config(0.0, 48_000.0, 10.0);
                param.set_target(1.0);
                for _ in 0..size {
                    black_box(param.advance());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_soft_knee_limit, bench_sin_turns, bench_smoothed_param);
criterion_main!(benches);
