use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::graph::node::{GraphError, GraphNode, RenderCtx};
use crate::graph::param::AudioParam;
use crate::MAX_BLOCK_SIZE;

/*
Scheduled Oscillator
====================

A one-shot sound source. It is silent until its start time, runs until its
stop time, and is then finished for good. Restarting means creating a new
oscillator: `start` may be called once. `stop` needs a prior `start`, and a
later `stop` replaces an earlier one (that is how a scheduled note is cut
short).

  output
    │        ┌──────────────────┐
    │        │ ∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿ │
    └────────┘                  └──────→ time
           start               stop

The frequency is an automatable parameter read once per sample. Both start
and stop are sample-accurate: a sample at time t sounds when
start <= t < stop.

Example usage:
  let osc = ctx.create_oscillator()?;
  let node = ctx.oscillator_mut(&osc)?;
  node.set_waveform(Waveform::Sawtooth);
  node.frequency_mut().set_value_at_time(220.0, now)?;
  node.start(now)?;
  node.stop(now + 1.0)?;
*/

/// Frequency before any automation: 440 Hz.
pub const DEFAULT_FREQUENCY: f32 = 440.0;

pub struct OscillatorNode {
    osc: OscillatorBlock,
    frequency: AudioParam,
    start_time: Option<f64>,
    stop_time: Option<f64>,
    freq_buffer: Vec<f32>,
}

impl OscillatorNode {
    pub fn new() -> Self {
        Self {
            osc: OscillatorBlock::new(Waveform::Sine),
            frequency: AudioParam::new(DEFAULT_FREQUENCY),
            start_time: None,
            stop_time: None,
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.osc.set_waveform(waveform);
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut AudioParam {
        &mut self.frequency
    }

    /// Schedule the oscillator to begin sounding at `when` seconds.
    pub fn start(&mut self, when: f64) -> Result<(), GraphError> {
        if !(when.is_finite() && when >= 0.0) {
            return Err(GraphError::InvalidTime(when));
        }
        if self.start_time.is_some() {
            return Err(GraphError::InvalidState("oscillator already started"));
        }
        self.start_time = Some(when);
        Ok(())
    }

    /// Schedule the oscillator to fall silent at `when` seconds.
    ///
    /// Calling again replaces the earlier stop time. A stop time in the past
    /// takes effect immediately.
    pub fn stop(&mut self, when: f64) -> Result<(), GraphError> {
        if !(when.is_finite() && when >= 0.0) {
            return Err(GraphError::InvalidTime(when));
        }
        if self.start_time.is_none() {
            return Err(GraphError::InvalidState("oscillator not started"));
        }
        self.stop_time = Some(when);
        Ok(())
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Whether a sample at `time` is audible.
    #[inline]
    pub fn is_sounding_at(&self, time: f64) -> bool {
        sounding(self.start_time, self.stop_time, time)
    }

    /// Return to the freshly created state: sine at the default frequency,
    /// no automation, not started.
    pub(crate) fn reset(&mut self) {
        self.osc.set_waveform(Waveform::Sine);
        self.osc.reset();
        self.frequency.reset();
        self.start_time = None;
        self.stop_time = None;
    }
}

#[inline]
fn sounding(start: Option<f64>, stop: Option<f64>, time: f64) -> bool {
    match start {
        Some(start) => time >= start && stop.map_or(true, |stop| time < stop),
        None => false,
    }
}

impl Default for OscillatorNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphNode for OscillatorNode {
    fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let (start, stop) = (self.start_time, self.stop_time);
        let freqs = &mut self.freq_buffer[..buffer.len()];
        self.frequency.render(freqs, ctx.time, ctx.sample_rate);

        for (i, (sample, &freq)) in buffer.iter_mut().zip(freqs.iter()).enumerate() {
            *sample = if sounding(start, stop, ctx.time_at(i)) {
                self.osc.next_sample(freq, ctx.sample_rate)
            } else {
                0.0
            };
        }
    }

    fn has_finished(&self, time: f64) -> bool {
        self.stop_time.is_some_and(|stop| time >= stop)
    }
}
