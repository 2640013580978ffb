//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keynote::dsp::filter::SVFilter;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Fixed cutoff: coefficient is computed once and cached
        let fixed = vec![1_500.0f32; size];
        let mut filter = SVFilter::new();
        group.bench_with_input(BenchmarkId::new("lowpass_fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&fixed), SAMPLE_RATE);
            })
        });

        // Sweeping cutoff: tan() every sample
        let sweep: Vec<f32> = (0..size)
            .map(|i| 200.0 + 4_000.0 * i as f32 / size as f32)
            .collect();
        let mut filter = SVFilter::new();
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&sweep), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
