//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keynote::dsp::oscillator::{OscillatorBlock, Waveform};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let frequency = vec![440.0f32; size];

        for (name, waveform) in [
            // sin() per sample
            ("sine", Waveform::Sine),
            // linear ramp
            ("sawtooth", Waveform::Sawtooth),
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(&frequency), SAMPLE_RATE);
                })
            });
        }
    }

    group.finish();
}
