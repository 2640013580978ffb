//! Piano voice.
//!
//! A sawtooth rounded off by a fixed low-pass filter.
//! The saw supplies every harmonic; the 1500 Hz cutoff keeps the bright
//! attack of a struck string without the raw buzz.
//!
//! # Signal Path
//!
//! ```text
//! oscillator (saw) → lowpass 1500 Hz → gain (envelope) → destination
//! ```

use crate::dsp::oscillator::Waveform;
use crate::graph::{AudioContext, GraphError, OscillatorHandle};

use super::envelope;

pub const WAVEFORM: Waveform = Waveform::Sawtooth;
pub const FILTER_CUTOFF: f32 = 1_500.0;

/// Configure `oscillator` as a piano note and wire it to the destination.
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
    let filter = ctx.create_lowpass_filter()?;
    ctx.filter_mut(&filter)?
        .frequency_mut()
        .set_value_at_time(FILTER_CUTOFF, now)?;

    let destination = ctx.destination();
    ctx.connect(&oscillator, &filter)?;
    ctx.connect(&filter, &gain)?;
    ctx.connect(&gain, &destination)?;

    envelope::apply(ctx.gain_mut(&gain)?.gain_mut(), start, duration)?;

    Ok(oscillator)
}
