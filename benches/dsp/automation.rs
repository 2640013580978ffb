//! Benchmarks for parameter automation rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keynote::dsp::automation::ParamTimeline;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    // the note envelope shape over one second
    let mut envelope = ParamTimeline::new(1.0);
    envelope.set_value_at_time(0.0, 0.0);
    envelope.linear_ramp_to_value_at_time(1.0, 0.02);
    envelope.exponential_ramp_to_value_at_time(0.5, 0.1);
    envelope.exponential_ramp_to_value_at_time(0.2, 0.9);
    envelope.linear_ramp_to_value_at_time(0.0, 1.0);

    let mut constant = ParamTimeline::new(440.0);
    constant.set_value_at_time(220.0, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Inside the exponential decay segment
        group.bench_with_input(BenchmarkId::new("envelope", size), &size, |b, _| {
            b.iter(|| {
                envelope.render(black_box(&mut buffer), black_box(0.5), SAMPLE_RATE);
            })
        });

        group.bench_with_input(BenchmarkId::new("constant", size), &size, |b, _| {
            b.iter(|| {
                constant.render(black_box(&mut buffer), black_box(0.5), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
