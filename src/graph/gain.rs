use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::param::AudioParam;
use crate::MAX_BLOCK_SIZE;

/// Multiplies its input by an automatable gain curve.
///
/// This is where a note's volume envelope lives: schedule the curve on
/// [`gain_mut`](GainNode::gain_mut) and the node follows it sample by sample.
pub struct GainNode {
    gain: AudioParam,
    gain_buffer: Vec<f32>,
}

impl GainNode {
    pub fn new() -> Self {
        Self {
            gain: AudioParam::new(1.0),
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    pub fn gain_mut(&mut self) -> &mut AudioParam {
        &mut self.gain
    }

    pub(crate) fn reset(&mut self) {
        self.gain.reset();
    }
}

impl Default for GainNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphNode for GainNode {
    fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let gains = &mut self.gain_buffer[..buffer.len()];
        self.gain.render(gains, ctx.time, ctx.sample_rate);

        for (sample, &gain) in buffer.iter_mut().zip(gains.iter()) {
            *sample *= gain;
        }
    }
}
