//! Benchmarks for a single sounding note voice.
//!
//! Each render goes through the whole graph: oscillator, optional low-pass
//! filter, gain envelope and destination, plus the voice's timer check.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keynote::{Instrument, InstrumentSelector, NoteVoice};

use crate::{BLOCK_SIZES, HELD_DURATION};

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Idle voice: only the destination is rendered
        let mut idle = NoteVoice::new("A4", InstrumentSelector::default(), SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.render(black_box(&mut buffer)))
        });

        // piano: sawtooth → low-pass → gain
        let mut piano = NoteVoice::new("A4", InstrumentSelector::new(Instrument::Piano), SAMPLE_RATE);
        if piano.play_note(HELD_DURATION).is_ok() {
            group.bench_with_input(BenchmarkId::new("piano", size), &size, |b, _| {
                b.iter(|| piano.render(black_box(&mut buffer)))
            });
        }

        // bass: sine → gain
        let mut bass = NoteVoice::new("A2", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
        if bass.play_note(HELD_DURATION).is_ok() {
            group.bench_with_input(BenchmarkId::new("bass", size), &size, |b, _| {
                b.iter(|| bass.render(black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}
