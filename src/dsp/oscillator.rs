use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

Every periodic waveform is a function of phase: a number in [0, 1) that walks
forward by `frequency / sample_rate` each sample and wraps around once per
cycle. The waveform only decides how phase maps to amplitude.

    sine       sin(2π · phase)           pure tone, no harmonics
    sawtooth   2 · phase - 1             every harmonic, bright and buzzy

Phase is kept in f64 so long notes do not drift. Frequency is read per
sample, which lets automation change pitch mid-block without clicks.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Sawtooth,
}

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f64,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce one sample at `frequency` Hz and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let phase = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        };

        self.phase += f64::from(frequency) / f64::from(sample_rate);
        self.phase -= self.phase.floor();

        sample as f32
    }

    /// Render one block, reading the frequency for each sample from `frequency`.
    pub fn render(&mut self, out: &mut [f32], frequency: &[f32], sample_rate: f32) {
        for (sample, &freq) in out.iter_mut().zip(frequency) {
            *sample = self.next_sample(freq, sample_rate);
        }
    }
}
