use std::f32::consts::PI;

/*
Topology-preserving (trapezoidal) state-variable filter, low-pass output.

  input ──→ [integrator 1] ──→ [integrator 2] ──→ low-pass
                  ↑                   │
                  └──── damping k ────┘

Damping is fixed at k = 2 (critically damped): the response rolls off at
12 dB/octave above the cutoff with no resonant peak. Cutoff can change every
sample, so `g` is recomputed only when the incoming cutoff differs from the
last one seen.
*/

const DAMPING: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cached_cutoff: f32,
    cached_g: f32,
}

impl SVFilter {
    pub fn new() -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cached_cutoff: f32::NAN,
            cached_g: 0.0,
        }
    }

    #[inline]
    fn g_for(&mut self, cutoff_hz: f32, sample_rate: f32) -> f32 {
        if cutoff_hz != self.cached_cutoff {
            // keep the pre-warped cutoff below Nyquist
            let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.49);
            self.cached_g = (PI * cutoff / sample_rate).tan();
            self.cached_cutoff = cutoff_hz;
        }
        self.cached_g
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + DAMPING));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter `buffer` in place, with one cutoff value per sample.
    pub fn render(&mut self, buffer: &mut [f32], cutoff_hz: &[f32], sample_rate: f32) {
        for (sample, &cutoff) in buffer.iter_mut().zip(cutoff_hz) {
            let g = self.g_for(cutoff, sample_rate);
            *sample = self.next_sample(*sample, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

impl Default for SVFilter {
    fn default() -> Self {
        Self::new()
    }
}
