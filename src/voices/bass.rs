//! Bass voice.
//!
//! A plain sine: the fundamental with no overtones, so low notes stay round
//! and never muddy the mix. Nothing to filter, so the oscillator feeds the
//! envelope directly.
//!
//! # Signal Path
//!
//! ```text
//! oscillator (sine) → gain (envelope) → destination
//! ```

use crate::dsp::oscillator::Waveform;
use crate::graph::{AudioContext, GraphError, OscillatorHandle};

use super::envelope;

pub const WAVEFORM: Waveform = Waveform::Sine;

/// Configure `oscillator` as a bass note and wire it to the destination.
pub fn build(
    ctx: &mut AudioContext,
    oscillator: OscillatorHandle,
    frequency: f64,
    start: f64,
    duration: f64,
) -> Result<OscillatorHandle, GraphError> {
    let now = ctx.current_time();

    let osc = ctx.oscillator_mut(&oscillator)?;
    osc.set_waveform(WAVEFORM);
    osc.frequency_mut().set_value_at_time(frequency as f32, now)?;

    let gain = ctx.create_gain()?;

    let destination = ctx.destination();
    ctx.connect(&oscillator, &gain)?;
    ctx.connect(&gain, &destination)?;

    envelope::apply(ctx.gain_mut(&gain)?.gain_mut(), start, duration)?;

    Ok(oscillator)
}
