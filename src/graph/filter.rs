use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
    graph::param::AudioParam,
    MAX_BLOCK_SIZE,
};

/*
Filter Node
===========

A filter removes or attenuates certain frequencies from a signal. In
subtractive synthesis you start with a harmonically rich waveform (like a
sawtooth) and filter out what you do not want. A piano-ish tone is a bright
saw with its upper harmonics rolled off:

  sawtooth → lowpass(1500 Hz) → gain envelope

Cutoff (Hz): where the filter takes effect.
  - 200 Hz:    Muffled, like through a wall
  - 1500 Hz:   Warm, rounded, still articulate
  - 5000 Hz:   Present, clear
  - 20000 Hz:  Fully open

The cutoff is an automatable parameter, so sweeps are scheduled the same way
as gain envelopes.
*/

/// Cutoff before any automation.
pub const DEFAULT_CUTOFF: f32 = 350.0;

pub struct FilterNode {
    filter: SVFilter,
    frequency: AudioParam,
    cutoff_buffer: Vec<f32>,
}

impl FilterNode {
    pub fn lowpass() -> Self {
        Self {
            filter: SVFilter::new(),
            frequency: AudioParam::new(DEFAULT_CUTOFF),
            cutoff_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut AudioParam {
        &mut self.frequency
    }

    /// Clear the filter memory and all cutoff automation.
    pub(crate) fn reset(&mut self) {
        self.filter.reset();
        self.frequency.reset();
    }
}

impl GraphNode for FilterNode {
    fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let cutoffs = &mut self.cutoff_buffer[..buffer.len()];
        self.frequency.render(cutoffs, ctx.time, ctx.sample_rate);
        self.filter.render(buffer, cutoffs, ctx.sample_rate);
    }
}
