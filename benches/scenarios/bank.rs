//! Benchmarks for a full keyboard row of voices.
//!
//! Thirteen voices, as in the binary. The worst case has every key sounding
//! at once; the common case has a chord of three.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keynote::synth::bank::VoiceBank;
use keynote::synth::message::VoiceMessage;
use keynote::InstrumentSelector;

use crate::{BLOCK_SIZES, HELD_DURATION};

const SAMPLE_RATE: f32 = 48_000.0;

const ROW: [&str; 13] = [
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", "C5",
];

fn bank_with(sounding: &[usize]) -> VoiceBank<VecDeque<VoiceMessage>> {
    let queue = sounding
        .iter()
        .map(|&voice| VoiceMessage::Toggle {
            voice,
            duration: HELD_DURATION,
        })
        .collect();
    VoiceBank::new(ROW, InstrumentSelector::default(), SAMPLE_RATE, queue)
}

pub fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/bank");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // C major triad
        let mut chord = bank_with(&[0, 4, 7]);
        group.bench_with_input(BenchmarkId::new("chord", size), &size, |b, _| {
            b.iter(|| chord.render_block(black_box(&mut buffer)))
        });

        let all: Vec<usize> = (0..ROW.len()).collect();
        let mut full = bank_with(&all);
        group.bench_with_input(BenchmarkId::new("all_keys", size), &size, |b, _| {
            b.iter(|| full.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}
